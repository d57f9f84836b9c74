//! ILI9341 panel and flip-clock face setup
//!
//! The panel sits on SPI0 in landscape (320x240); the face is drawn
//! from three sprite sheets stored in flash.

use defmt::*;
use display_interface_spi::SPIInterface;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIN_17, PIN_18, PIN_19, PIN_20, PIN_21, PIN_22, SPI0};
use embassy_rp::spi::{self, Blocking, Spi};
use embassy_rp::Peri;
use embassy_time::Delay;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use ili9341::{DisplaySize240x320, Ili9341, Orientation};
use static_cell::StaticCell;

use flipclock_display::{FlipClock, FlipClockConfig, SpriteSheets};

/// SPI clock for the panel
const SPI_FREQUENCY: u32 = 40_000_000;

/// Frames per flip in the animation sheets
pub const FRAME_COUNT: u8 = 5;

static STATIC_SHEET: &[u8] = include_bytes!("../assets/static_s.bmp");
static TOP_ANIM_SHEET: &[u8] = include_bytes!("../assets/top_anim_s_5f.bmp");
static BOTTOM_ANIM_SHEET: &[u8] = include_bytes!("../assets/btm_anim_s_5f.bmp");

/// Backlight pin, held high for the life of the firmware
static BACKLIGHT: StaticCell<Output<'static>> = StaticCell::new();

type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, NoDelay>;

/// The ILI9341 driver as wired on the board
pub type Panel = Ili9341<SPIInterface<PanelSpi, Output<'static>>, Output<'static>>;

/// The clock face driven by the refresh loop
pub type Face = FlipClock<'static, Panel, Delay>;

/// Panel wiring
pub struct PanelPins {
    pub spi: Peri<'static, SPI0>,
    pub clk: Peri<'static, PIN_18>,
    pub mosi: Peri<'static, PIN_19>,
    pub cs: Peri<'static, PIN_17>,
    pub dc: Peri<'static, PIN_20>,
    pub rst: Peri<'static, PIN_21>,
    pub backlight: Peri<'static, PIN_22>,
}

/// Reset the panel, clear it and switch the backlight on
///
/// Panics if the panel does not respond; the clock is useless without it.
pub fn init_panel(pins: PanelPins) -> Panel {
    let mut config = spi::Config::default();
    config.frequency = SPI_FREQUENCY;
    let spi = Spi::new_blocking_txonly(pins.spi, pins.clk, pins.mosi, config);

    let cs = Output::new(pins.cs, Level::High);
    let dc = Output::new(pins.dc, Level::Low);
    let rst = Output::new(pins.rst, Level::High);

    let device = match ExclusiveDevice::new(spi, cs, NoDelay) {
        Ok(device) => device,
        Err(_) => defmt::panic!("Panel chip select unavailable"),
    };
    let interface = SPIInterface::new(device, dc);

    let mut panel = match Ili9341::new(
        interface,
        rst,
        &mut Delay,
        Orientation::Landscape,
        DisplaySize240x320,
    ) {
        Ok(panel) => panel,
        Err(e) => defmt::panic!("Panel init failed: {}", Debug2Format(&e)),
    };

    if let Err(e) = panel.clear(Rgb565::BLACK) {
        defmt::panic!("Panel clear failed: {}", Debug2Format(&e));
    }
    BACKLIGHT.init(Output::new(pins.backlight, Level::High));

    info!("Panel ready");
    panel
}

/// Build the flip-clock face on the panel
///
/// The sheets are checked against each other here; a mismatch is a
/// packaging defect and panics.
pub fn build_face(panel: Panel) -> Face {
    let sheets = match SpriteSheets::load(
        STATIC_SHEET,
        TOP_ANIM_SHEET,
        BOTTOM_ANIM_SHEET,
        FRAME_COUNT,
    ) {
        Ok(sheets) => sheets,
        Err(e) => defmt::panic!("Sprite sheets invalid: {}", e),
    };
    debug!(
        "Tiles {}x{} px",
        sheets.geometry().width,
        sheets.geometry().height()
    );

    FlipClock::new(panel, Delay, sheets, FlipClockConfig::default())
}
