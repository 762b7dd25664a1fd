//! Parameter block scrubbing.
//!
//! Templates may carry authoring-time metadata in their parameter blocks
//! (generator annotations, editor hints) that the remote API rejects. Every
//! submission path scrubs the template first; scrubbing an already-scrubbed
//! template is a no-op.

use crate::template::Template;

/// Parameter attributes the remote API accepts.
pub const ALLOWED_PARAMETER_ATTRIBUTES: [&str; 11] = [
    "Type",
    "Default",
    "NoEcho",
    "AllowedValues",
    "AllowedPattern",
    "MaxLength",
    "MinLength",
    "MaxValue",
    "MinValue",
    "Description",
    "ConstraintDescription",
];

/// Remove every unsupported attribute from the template's parameter blocks.
pub fn scrub(template: &mut Template) {
    let Some(parameters) = template.parameters_block_mut() else {
        return;
    };
    for (name, options) in parameters.iter_mut() {
        let Some(block) = options.as_object_mut() else {
            log::warn!("parameter {name} is not an object; leaving it untouched");
            continue;
        };
        block.retain(|attribute, _| ALLOWED_PARAMETER_ATTRIBUTES.contains(&attribute.as_str()));
    }
}
