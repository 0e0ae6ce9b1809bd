use toolchain::Directive;

/// Size of the per-loop action space.
pub const NUM_ACTIONS: usize = 4;

/// Maps an action to a directive: 0 disables vectorization, 1..=3 request
/// widths 2, 4 and 8. Anything else also disables.
#[must_use]
pub fn decode(action: i64) -> Directive {
    match action {
        1 => Directive::Width(2),
        2 => Directive::Width(4),
        3 => Directive::Width(8),
        _ => Directive::Disable,
    }
}
