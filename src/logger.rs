use std::{
    fmt::Display,
    io::{stdout, Write},
    time::Instant,
};

pub fn ansi<T: Display, U: Display>(x: T, y: U) -> String {
    format!("\x1b[{y}m{x}\x1b[0m")
}

/// Prints an in-place progress line, overwritten by the next call.
pub fn report_encoding_progress(batches: usize, positions: usize, timer: &Instant) {
    let elapsed = timer.elapsed().as_secs_f32();
    let pos_per_sec = positions as f32 / elapsed;

    print!(
        "batch {} | {} positions | {} pos/sec     \r",
        ansi(batches, 36),
        ansi(positions, 36),
        ansi(format!("{pos_per_sec:.0}"), 36),
    );
    let _ = stdout().flush();
}

pub fn seconds_to_hms(mut seconds: u32) -> (u32, u32, u32) {
    let mut minutes = seconds / 60;
    let hours = minutes / 60;
    seconds -= minutes * 60;
    minutes -= hours * 60;

    (hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms() {
        assert_eq!(seconds_to_hms(0), (0, 0, 0));
        assert_eq!(seconds_to_hms(3725), (1, 2, 5));
    }

    #[test]
    fn colours() {
        assert_eq!(ansi(5, 31), "\x1b[31m5\x1b[0m");
    }
}
