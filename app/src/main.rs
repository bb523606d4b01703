#![no_main]
#![no_std]

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m_rt::{entry, exception};
use embedded_hal_02::digital::v2::OutputPin;
use log::{info, LevelFilter};
use panic_halt as _;

use stm32f0xx_hal as hal;

use debounce::{Clock, DebouncedInput, Duration, InputConfig, Instant, DEFAULT_INPUT_CONFIG};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;

use pin_adapter::InputPinAdapter;

mod pin_adapter;
mod serial;

/// Front panel controls of the looper
#[derive(Clone, Copy, Debug)]
enum PanelButton {
    Record,
    Play,
    Delete,
    Footswitch,
}

/// Buttons wired to ground with the internal pull-up
static PANEL_CONFIG: InputConfig = DEFAULT_INPUT_CONFIG;

/// The footswitch has an external pull-down and a slower, heavier contact
static FOOTSWITCH_CONFIG: InputConfig = InputConfig {
    active_low: false,
    debounce: Duration::millis(30),
    hold: Duration::millis(1000),
};

const DELETE_HOLD: Duration = Duration::millis(1500);

/// SysTick rate; one tick per millisecond
const TICK_HZ: u32 = 1000;

static TIME: AtomicU32 = AtomicU32::new(0);

/// Millisecond clock backed by the SysTick counter
struct SysTickClock;

impl Clock for SysTickClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(TIME.load(Ordering::Relaxed))
    }
}

static CLOCK: SysTickClock = SysTickClock;

fn on_press(button: PanelButton) {
    info!("{:?} pressed", button);
}

fn on_release(button: PanelButton) {
    info!("{:?} released", button);
}

fn on_hold(button: PanelButton) {
    info!("{:?} held", button);
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);
    let gpioc = dp.GPIOC.split(&mut rcc);

    // A library requiring a critical section to set a gpio mode register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);
    serial::logger::init(LevelFilter::Info);

    // Pull must match InputConfig::pull() for each config
    let record_pin = gpioa.pa0.into_pull_up_input(&fake_cs);
    let play_pin = gpioa.pa1.into_pull_up_input(&fake_cs);
    let delete_pin = gpioa.pa4.into_pull_up_input(&fake_cs);
    let footswitch_pin = gpioa.pa5.into_floating_input(&fake_cs);

    let mut activity_led = gpioc.pc8.into_push_pull_output(&fake_cs);

    let mut record = DebouncedInput::new(
        InputPinAdapter::new(record_pin),
        &CLOCK,
        PanelButton::Record,
        &PANEL_CONFIG,
    )
    .unwrap();
    record.on_press(Some(on_press));
    record.on_hold(Some(on_hold), PANEL_CONFIG.hold);

    let mut play = DebouncedInput::new(
        InputPinAdapter::new(play_pin),
        &CLOCK,
        PanelButton::Play,
        &PANEL_CONFIG,
    )
    .unwrap();
    play.on_press(Some(on_press));

    let mut delete = DebouncedInput::new(
        InputPinAdapter::new(delete_pin),
        &CLOCK,
        PanelButton::Delete,
        &PANEL_CONFIG,
    )
    .unwrap();
    // Delete only acts on a long press
    delete.on_hold(Some(on_hold), DELETE_HOLD);

    let mut footswitch = DebouncedInput::new(
        InputPinAdapter::new(footswitch_pin),
        &CLOCK,
        PanelButton::Footswitch,
        &FOOTSWITCH_CONFIG,
    )
    .unwrap();
    footswitch.on_press(Some(on_press));
    footswitch.on_release(Some(on_release));
    footswitch.on_hold(Some(on_hold), FOOTSWITCH_CONFIG.hold);

    // Start the tick last, so the inputs' start time is consistent
    let mut syst = hal::timers::Timer::syst(cp.SYST, TICK_HZ.hz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    info!("looper panel ready");

    let mut last_tick = TIME.load(Ordering::Relaxed);

    loop {
        let time = TIME.load(Ordering::Relaxed);
        if time == last_tick {
            continue;
        }
        last_tick = time;

        // Pin reads can't fail on this HAL
        record.poll().unwrap_or_default();
        play.poll().unwrap_or_default();
        delete.poll().unwrap_or_default();
        footswitch.poll().unwrap_or_default();

        let any_active = record.is_active()
            || play.is_active()
            || delete.is_active()
            || footswitch.is_active();
        if any_active {
            activity_led.set_high().ok();
        } else {
            activity_led.set_low().ok();
        }
    }
}

#[exception]
fn SysTick() {
    // No atomic read-modify-write on the M0; only this handler writes TIME.
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
