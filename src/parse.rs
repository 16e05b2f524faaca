//! Host message parsing.
//!
//! Turns an assembled [`Value`] into the closed [`Command`] grammar. Every
//! key mapping and value coercion happens here, exactly once; nothing
//! downstream matches on wire strings again. A parse failure drops the
//! whole message, so a command that reaches the display is structurally
//! sound and only runtime checks (animation names, bounds) remain.

use alloc::vec::Vec;
use smart_leds::RGB8;

use crate::color;
use crate::command::{
    AnimationSpec, AttributeOp, Command, Directive, Name, ReconfigureCommand, name_from,
};
use crate::config::{ConfigSource, StrandConfig};
use crate::json::Value;

/// Errors that can occur while parsing a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The message root or a nested body is not the expected JSON shape.
    InvalidSchema,
    /// A top-level key is not an unsigned integer strand index.
    InvalidIndex(Name),
    /// A directive key is not in the attribute table.
    UnknownAttribute(Name),
    /// A color name did not resolve against the name table.
    InvalidColor(Name),
    /// An attribute value failed type or range coercion.
    InvalidValue(&'static str),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::InvalidSchema => {
                write!(f, "message is not an object of the expected shape")
            }
            ParseError::InvalidIndex(key) => {
                write!(f, "key '{}' is not an unsigned strand index", key)
            }
            ParseError::UnknownAttribute(name) => {
                write!(f, "unknown attribute '{}'", name)
            }
            ParseError::InvalidColor(name) => {
                write!(f, "unknown color '{}'", name)
            }
            ParseError::InvalidValue(attribute) => {
                write!(f, "invalid value for '{}'", attribute)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Parses one decoded message.
///
/// `configs` supplies each strand's sticky config so sequence entries can
/// snapshot it as of message receipt; later attribute changes do not reach
/// into an already parsed sequence.
///
/// A `"reconfigure"` key takes precedence over directives: the remaining
/// top-level keys are still validated as strand indices but produce
/// nothing.
pub fn parse_message(
    value: &Value,
    configs: &impl ConfigSource,
) -> Result<Command, ParseError> {
    let root = value.as_object().ok_or(ParseError::InvalidSchema)?;

    if let Some(reconfigure) = root.get("reconfigure") {
        for key in root.keys().filter(|key| *key != "reconfigure") {
            parse_index(key)?;
        }
        return Ok(Command::Reconfigure(parse_reconfigure(reconfigure)?));
    }

    let mut directives = Vec::with_capacity(root.len());
    for (key, body) in root.iter() {
        let strand = parse_index(key)?;
        let ops = parse_ops(strand, body, configs)?;
        directives.push(Directive::new(strand, ops));
    }

    Ok(Command::Directives(directives))
}

fn parse_index(key: &str) -> Result<u32, ParseError> {
    key.parse::<u32>()
        .map_err(|_| ParseError::InvalidIndex(name_from(key)))
}

fn parse_reconfigure(value: &Value) -> Result<ReconfigureCommand, ParseError> {
    let body = value.as_object().ok_or(ParseError::InvalidSchema)?;

    let strand_map = body
        .get("strands")
        .and_then(Value::as_object)
        .ok_or(ParseError::InvalidSchema)?;

    let mut strands = Vec::with_capacity(strand_map.len());
    for (key, length) in strand_map.iter() {
        let index = parse_index(key)?;
        let length = coerce_u32(length).ok_or(ParseError::InvalidValue("strands"))?;
        strands.push((index, length));
    }
    strands.sort_unstable_by_key(|&(index, _)| index);

    let brightness = match body.get("brightness") {
        Some(value) => coerce_f32(value).ok_or(ParseError::InvalidValue("brightness"))?,
        None => 1.0,
    };

    Ok(ReconfigureCommand { strands, brightness })
}

fn parse_ops(
    strand: u32,
    body: &Value,
    configs: &impl ConfigSource,
) -> Result<Vec<AttributeOp>, ParseError> {
    let entries = body.as_object().ok_or(ParseError::InvalidSchema)?;

    let mut ops = Vec::with_capacity(entries.len());
    for (key, value) in entries.iter() {
        ops.push(parse_op(strand, key, value, configs)?);
    }

    Ok(ops)
}

fn parse_op(
    strand: u32,
    key: &str,
    value: &Value,
    configs: &impl ConfigSource,
) -> Result<AttributeOp, ParseError> {
    let op = match key {
        "set_animation" => {
            let name = value
                .as_str()
                .ok_or(ParseError::InvalidValue("set_animation"))?;
            AttributeOp::SetAnimation(name_from(name))
        }
        "speed" => AttributeOp::SetSpeed(parse_speed(value)?),
        "color" => AttributeOp::SetColor(parse_color(value, "color")?),
        "colors" => {
            let list = value.as_array().ok_or(ParseError::InvalidValue("colors"))?;
            if list.is_empty() {
                return Err(ParseError::InvalidValue("colors"));
            }
            let mut colors = Vec::with_capacity(list.len());
            for entry in list {
                colors.push(parse_color(entry, "colors")?);
            }
            AttributeOp::SetColors(colors)
        }
        "tail_length" => AttributeOp::SetTailLength(coerce_field(value, "tail_length")?),
        "bounce" => {
            let flag = value.as_bool().ok_or(ParseError::InvalidValue("bounce"))?;
            AttributeOp::SetBounce(flag)
        }
        "size" => AttributeOp::SetSize(coerce_field(value, "size")?),
        "spacing" => AttributeOp::SetSpacing(coerce_field(value, "spacing")?),
        "period" => AttributeOp::SetPeriod(coerce_field(value, "period")?),
        "num_sparkles" => AttributeOp::SetNumSparkles(coerce_field(value, "num_sparkles")?),
        "step" => AttributeOp::SetStep(coerce_field(value, "step")?),
        "set_pixel_colors" => AttributeOp::SetPixelColors(parse_pixel_map(value)?),
        "sequence" => parse_sequence(strand, value, configs)?,
        _ => return Err(ParseError::UnknownAttribute(name_from(key))),
    };

    Ok(op)
}

fn parse_speed(value: &Value) -> Result<f32, ParseError> {
    coerce_f32(value)
        .filter(|speed| *speed > 0.0)
        .ok_or(ParseError::InvalidValue("speed"))
}

/// A color is a symbolic name or a literal `[r, g, b]` triple.
fn parse_color(value: &Value, attribute: &'static str) -> Result<RGB8, ParseError> {
    match value {
        Value::String(name) => {
            color::resolve(name).ok_or_else(|| ParseError::InvalidColor(name_from(name)))
        }
        Value::Array(parts) => {
            if parts.len() != 3 {
                return Err(ParseError::InvalidValue(attribute));
            }
            let mut rgb = [0u8; 3];
            for (slot, part) in rgb.iter_mut().zip(parts) {
                *slot = coerce_u32(part)
                    .and_then(|component| u8::try_from(component).ok())
                    .ok_or(ParseError::InvalidValue(attribute))?;
            }
            Ok(RGB8::new(rgb[0], rgb[1], rgb[2]))
        }
        _ => Err(ParseError::InvalidValue(attribute)),
    }
}

/// Pixel writes keyed by strand-relative index, in document order.
fn parse_pixel_map(value: &Value) -> Result<Vec<(u32, RGB8)>, ParseError> {
    let entries = value
        .as_object()
        .ok_or(ParseError::InvalidValue("set_pixel_colors"))?;

    let mut writes = Vec::with_capacity(entries.len());
    for (key, color) in entries.iter() {
        let pixel = key
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidValue("set_pixel_colors"))?;
        writes.push((pixel, parse_color(color, "set_pixel_colors")?));
    }

    Ok(writes)
}

/// `{"animations": [...], "duration": seconds}`.
///
/// Each entry must name an animation and may override any attribute; the
/// rest of its snapshot comes from the strand's config at parse time.
/// Entries cannot nest sequences or carry manual pixel writes.
fn parse_sequence(
    strand: u32,
    value: &Value,
    configs: &impl ConfigSource,
) -> Result<AttributeOp, ParseError> {
    let body = value.as_object().ok_or(ParseError::InvalidValue("sequence"))?;

    let entries = body
        .get("animations")
        .and_then(Value::as_array)
        .ok_or(ParseError::InvalidValue("sequence"))?;
    if entries.is_empty() {
        return Err(ParseError::InvalidValue("sequence"));
    }

    let duration = match body.get("duration") {
        Some(value) => coerce_f32(value)
            .filter(|duration| *duration >= 0.0)
            .ok_or(ParseError::InvalidValue("duration"))?,
        None => 0.0,
    };

    let base = configs.strand_config(strand).cloned().unwrap_or_default();

    let mut specs = Vec::with_capacity(entries.len());
    for entry in entries {
        specs.push(parse_spec(strand, entry, &base, configs)?);
    }

    Ok(AttributeOp::SetSequence(specs, duration))
}

fn parse_spec(
    strand: u32,
    value: &Value,
    base: &StrandConfig,
    configs: &impl ConfigSource,
) -> Result<AnimationSpec, ParseError> {
    let body = value.as_object().ok_or(ParseError::InvalidValue("sequence"))?;

    let mut name: Option<Name> = None;
    let mut config = base.clone();

    for (key, value) in body.iter() {
        if key == "sequence" || key == "set_pixel_colors" {
            return Err(ParseError::InvalidValue("sequence"));
        }
        let op = parse_op(strand, key, value, configs)?;
        match op {
            AttributeOp::SetAnimation(wire) => name = Some(wire),
            other => other.store_into(&mut config),
        }
    }

    let name = name.ok_or(ParseError::InvalidValue("sequence"))?;
    Ok(AnimationSpec { name, config })
}

/// JSON number to `u32`, accepting only integral values in range.
///
/// Hosts routinely send integral floats like `2.0`; those coerce. Anything
/// fractional, negative, or out of range does not.
fn coerce_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }

    let f = value.as_f64()?;
    if f % 1.0 == 0.0 && f >= 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

fn coerce_field(value: &Value, attribute: &'static str) -> Result<u32, ParseError> {
    coerce_u32(value).ok_or(ParseError::InvalidValue(attribute))
}

fn coerce_f32(value: &Value) -> Option<f32> {
    value.as_f64().map(|f| f as f32)
}
