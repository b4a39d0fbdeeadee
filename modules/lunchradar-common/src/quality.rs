use crate::types::ExtractionResult;

/// Minimum item count for an extraction to be accepted. This single
/// threshold is the escalation trigger for the whole router — below it,
/// the next (more expensive) strategy is tried.
pub const MIN_ACCEPTABLE_ITEMS: usize = 3;

/// Pattern extraction accepts trailing prices only inside the plausible
/// lunch range; anything outside is a phone number, a year, or a weight.
pub const PATTERN_PRICE_MIN: u32 = 50;
pub const PATTERN_PRICE_MAX: u32 = 200;

/// Default price for weekday-labeled dishes with no explicit price.
pub const PATTERN_DEFAULT_PRICE: u32 = 110;

/// Text-AI items outside this range are discarded (the model was told the
/// range; violations mean it hallucinated or picked up dinner prices).
pub const TEXT_AI_PRICE_MIN: u32 = 40;
pub const TEXT_AI_PRICE_MAX: u32 = 300;

/// Vision items are clamped into this range instead of discarded — OCR of
/// "145:-" often drops a digit, and the dish itself is still real.
pub const VISION_PRICE_MIN: u32 = 50;
pub const VISION_PRICE_MAX: u32 = 300;
pub const VISION_DEFAULT_PRICE: u32 = 145;

/// Result-size caps, bounding downstream cost per source.
pub const PATTERN_MAX_ITEMS: usize = 30;
pub const AI_MAX_ITEMS: usize = 20;

/// The quality gate: count-only by intent. Field completeness and price
/// plausibility are handled at item validation, not here.
pub fn is_acceptable(result: &ExtractionResult) -> bool {
    result.items.len() >= MIN_ACCEPTABLE_ITEMS
}
