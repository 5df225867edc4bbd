use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

static HISTOGRAM_ROWS: OnceLock<usize> = OnceLock::new();

/// Number of scanlines sampled for the whole-image histogram
pub(crate) fn histogram_rows() -> usize {
    *HISTOGRAM_ROWS.get_or_init(|| parse_env_usize("LUMAGRID_HISTOGRAM_ROWS", 4).clamp(1, 32))
}

static MIN_DYNAMIC_RANGE: OnceLock<u32> = OnceLock::new();

/// Blocks whose max-min luminance spread is at or below this are treated as flat
pub(crate) fn min_dynamic_range() -> u32 {
    *MIN_DYNAMIC_RANGE
        .get_or_init(|| parse_env_u32("LUMAGRID_MIN_DYNAMIC_RANGE", 24).clamp(0, 128))
}
