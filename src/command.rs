//! Parsed command model for host messages.

use alloc::vec::Vec;
use smart_leds::RGB8;

use crate::config::StrandConfig;

/// Bounded copy of a wire identifier, as carried in ops, specs, and errors.
pub type Name = heapless::String<24>;

/// Clips a wire identifier into a [`Name`], truncating at capacity.
pub(crate) fn name_from(raw: &str) -> Name {
    let mut name = Name::new();
    for c in raw.chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    name
}

/// A single attribute operation within a strand directive.
///
/// One variant per wire key, applied in document order. How ops combine at
/// the end of a directive (animation builds, manual writes, sequences) is
/// the strand's business; the op itself is plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeOp {
    /// `"set_animation"`: select an animation by name.
    SetAnimation(Name),
    /// `"speed"`: seconds between animation frames.
    SetSpeed(f32),
    /// `"color"`: replace the color cycle with a single color.
    SetColor(RGB8),
    /// `"colors"`: replace the whole color cycle.
    SetColors(Vec<RGB8>),
    /// `"tail_length"`: comet tail length in pixels.
    SetTailLength(u32),
    /// `"bounce"`: whether comet-style animations reverse at the end.
    SetBounce(bool),
    /// `"size"`: lit block size for chase-style animations.
    SetSize(u32),
    /// `"spacing"`: gap between lit blocks for chase-style animations.
    SetSpacing(u32),
    /// `"period"`: pulse period in seconds.
    SetPeriod(u32),
    /// `"num_sparkles"`: number of simultaneously lit sparkles.
    SetNumSparkles(u32),
    /// `"step"`: hue step for rainbow-style animations.
    SetStep(u32),
    /// `"set_pixel_colors"`: direct strand-relative pixel writes in
    /// document order.
    SetPixelColors(Vec<(u32, RGB8)>),
    /// `"sequence"`: ordered animation specs plus the advance interval in
    /// seconds (`0.0` disables auto-advance).
    SetSequence(Vec<AnimationSpec>, f32),
}

impl AttributeOp {
    /// Writes an attribute op into a config.
    ///
    /// Mode-selecting ops (`SetAnimation`, `SetPixelColors`,
    /// `SetSequence`) store nothing; they pick what runs rather than how.
    pub(crate) fn store_into(&self, config: &mut StrandConfig) {
        match self {
            AttributeOp::SetSpeed(speed) => config.speed = *speed,
            AttributeOp::SetColor(color) => {
                config.colors.clear();
                config.colors.push(*color);
            }
            AttributeOp::SetColors(colors) => config.colors = colors.clone(),
            AttributeOp::SetTailLength(n) => config.tail_length = *n,
            AttributeOp::SetBounce(flag) => config.bounce = *flag,
            AttributeOp::SetSize(n) => config.size = *n,
            AttributeOp::SetSpacing(n) => config.spacing = *n,
            AttributeOp::SetPeriod(n) => config.period = *n,
            AttributeOp::SetNumSparkles(n) => config.num_sparkles = *n,
            AttributeOp::SetStep(n) => config.step = *n,
            AttributeOp::SetAnimation(_)
            | AttributeOp::SetPixelColors(_)
            | AttributeOp::SetSequence(..) => {}
        }
    }
}

/// One sequence entry: an animation name plus the config snapshot it will
/// be built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub name: Name,
    pub config: StrandConfig,
}

/// A directive addressed at one strand.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub strand: u32,
    pub ops: Vec<AttributeOp>,
}

impl Directive {
    /// Creates a directive.
    pub fn new(strand: u32, ops: Vec<AttributeOp>) -> Self {
        Self { strand, ops }
    }
}

/// Geometry and brightness for a full display rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconfigureCommand {
    /// `(index, length)` pairs sorted ascending by index.
    pub strands: Vec<(u32, u32)>,
    /// Global brightness in `0.0..=1.0`.
    pub brightness: f32,
}

/// A fully parsed host message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Rebuild the display geometry, discarding all strand state.
    Reconfigure(ReconfigureCommand),
    /// Per-strand directives in document order.
    Directives(Vec<Directive>),
}
