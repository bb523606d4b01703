/// An IRQ driven, transmit only serial port, and a `log` sink on top of it
///
pub mod uart1 {
    use crate::interrupt;
    use crate::hal::{
        pac,
        prelude::*,
        serial::{
            Event,
            Serial,
        }
    };
    use heapless::spsc::{Consumer, Producer, Queue};
    use stm32f0xx_hal::gpio::{
        gpiob,
        Alternate,
        AF0,
    };

    const TX_Q_SIZE: usize = 256;

    static mut TX_Q_CONSUMER: Option<Consumer<'static, u8, TX_Q_SIZE>> = None;
    static mut TX_Q_PRODUCER: Option<Producer<'static, u8, TX_Q_SIZE>> = None;

    pub type TxPinType = gpiob::PB6<Alternate<AF0>>;
    pub type RxPinType = gpiob::PB7<Alternate<AF0>>;
    static mut SERIAL: Option<Serial<pac::USART1, TxPinType, RxPinType>> = None;

    pub struct Uart1Tx {}

    impl core::fmt::Write for Uart1Tx {
        fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
            for b in s.bytes() {
                write_byte(b);
            }
            Ok(())
        }
    }

    /// Must be called once during application initialization, before any logging
    pub fn init(serial: Serial<pac::USART1, TxPinType, RxPinType>, irq_prio: u8) {
        let core = unsafe { pac::CorePeripherals::steal() };
        let mut nvic = core.NVIC;

        static mut TX_Q: Queue<u8, TX_Q_SIZE> = Queue::new();

        let (tx_q_producer, tx_q_consumer) = unsafe { TX_Q.split() };

        unsafe {
            TX_Q_PRODUCER = Some(tx_q_producer);
            TX_Q_CONSUMER = Some(tx_q_consumer);
            SERIAL = Some(serial);

            nvic.set_priority(pac::Interrupt::USART1, irq_prio);
            pac::NVIC::unmask(pac::Interrupt::USART1);
        }
    }

    pub fn write_byte(b: u8) {
        let tx_q_producer = unsafe { TX_Q_PRODUCER.as_mut().unwrap_unchecked() };
        // Drop the byte if the queue is full
        let _ = tx_q_producer.enqueue(b);
        let serial = unsafe { SERIAL.as_mut().unwrap_unchecked() };
        serial.listen(Event::Txe);
    }

    pub fn writer() -> Uart1Tx {
        Uart1Tx {}
    }

    #[interrupt]
    fn USART1() {
        let serial = unsafe { SERIAL.as_mut().unwrap_unchecked() };
        let tx_q_consumer = unsafe { TX_Q_CONSUMER.as_mut().unwrap_unchecked() };
        let usart1 = unsafe { crate::hal::pac::Peripherals::steal().USART1 };

        if (*usart1).isr.read().txe().bit_is_clear() {
            return;
        }

        match tx_q_consumer.dequeue() {
            Some(b) => {
                serial.write(b).ok();
            },
            None => {
                // Queue drained. Re-enabled by the next write_byte
                serial.unlisten(Event::Txe);
            }
        }
    }
}

pub mod logger {
    use core::fmt::Write;

    use log::{LevelFilter, Metadata, Record};

    use super::uart1;

    struct UartLogger;

    impl log::Log for UartLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            let mut w = uart1::writer();
            let _ = write!(w, "[{}] {}\r\n", record.level(), record.args());
        }

        fn flush(&self) {}
    }

    static LOGGER: UartLogger = UartLogger;

    /// Route `log` output to UART1. uart1::init must have been called first.
    pub fn init(level: LevelFilter) {
        // The M0 has no compare-and-swap, so the racy setters are the only option.
        // We're still single threaded at this point.
        unsafe {
            log::set_logger_racy(&LOGGER).ok();
            log::set_max_level_racy(level);
        }
    }
}
