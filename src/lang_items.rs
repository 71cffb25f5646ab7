//! Language items for bare-metal BRISC builds
//!
//! Every fatal port fault ends in a panic; on the target that panic halts
//! the core. Host builds use the standard library's handler.

#[cfg(all(target_os = "none", not(feature = "defmt")))]
use panic_halt as _;

// Defmt panic handler
#[cfg(all(target_os = "none", feature = "defmt"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    if let Some(location) = info.location() {
        defmt::error!("panic at {=str}:{=u32}", location.file(), location.line());
    }
    loop {
        core::hint::spin_loop();
    }
}
