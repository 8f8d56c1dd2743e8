#![no_std]
#![no_main]

mod display;
mod knob;
mod scan;

use panic_rtt_target as _;
use rtt_target::{rprint, rprintln, rtt_init_print};

use ai_scanner::{
    config::RESULT_MASK, emul::EmulConverter, AcquisitionConfig, ChannelId, Completion,
    ConversionController, HistoryStore, SequenceTable, Snapshot, State,
};
use embassy_executor::Spawner;
use embassy_futures::join;
use embassy_time::{Duration, Ticker, Timer};
use microbit_bsp::{
    embassy_nrf::{bind_interrupts, saadc},
    Button, Microbit,
};

use display::Display;
use knob::Knob;
use scan::Scan;

/// Per-channel history shared by the scan driver and the console.
static HISTORY: HistoryStore = HistoryStore::new();

const SCAN_PERIOD: Duration = Duration::from_millis(20);
const DISPLAY_PERIOD: Duration = Duration::from_millis(500);

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_init_print!();
    let board = Microbit::default();

    bind_interrupts!(struct Irqs {
        SAADC => saadc::InterruptHandler;
    });

    let mut saadc_config = saadc::Config::default();
    saadc_config.resolution = saadc::Resolution::_12BIT;
    let saadc = saadc::Saadc::new(
        board.saadc,
        Irqs,
        saadc_config,
        [saadc::ChannelConfig::single_ended(board.p2)],
    );
    let knob = Knob::new(saadc).await;

    let config = AcquisitionConfig::default();
    let table = SequenceTable::for_variant(config.variant);
    let mut adc = ConversionController::new(EmulConverter::new(), config, &HISTORY);
    if let Err(err) = adc.configure(&table).and_then(|()| adc.start()) {
        panic!("acquisition setup failed: {}", err);
    }

    let scan = Scan::new(adc, knob, board.btn_a, SCAN_PERIOD);
    let mut display = Display::new(&HISTORY, DISPLAY_PERIOD);

    join::join(scan.run(), display.run()).await;

    panic!("fell off end of main loop");
}
