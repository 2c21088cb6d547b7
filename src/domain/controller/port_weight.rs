/// Link weight of ports whose speed is unknown or below 100 Mb.
pub const DEFAULT_PORT_WEIGHT: u64 = 1000;

/// Maps an OpenFlow 1.0 current-feature bitmask to a link weight class.
///
/// | highest speed bit        | weight |
/// |--------------------------|--------|
/// | 10 Gb and above (bit 6+) | 1      |
/// | 1 Gb (bits 4, 5)         | 10     |
/// | 100 Mb (bits 2, 3)       | 100    |
/// | slower                   | 1000   |
///
/// An empty bitmask yields `default_weight`.
pub fn weight_class(curr: u32, default_weight: u64) -> u64 {
    if curr == 0 {
        return default_weight;
    }
    if curr >> 6 > 0 {
        return 1;
    }
    if curr >> 4 > 0 {
        return 10;
    }
    if curr >> 2 > 0 {
        return 100;
    }
    1000
}
