//! GET URL construction for the JSON protocol.
//!
//! ```text
//! base?action=getConfig&machineid=abc&task[]=inventory&task[]=deploy&opt[k]=v
//! ```
//!
//! Keys are emitted verbatim; values go through [`encode_value`]. Empty
//! scalars are left out entirely, empty list elements are kept as `key[]=`.

mod encode;
mod params;

pub use encode::{encode_value, truncate_value, ELLIPSIS, MAX_ENCODED_LEN};
pub use params::{ParamValue, Parameters};

/// Build the request URL for a JSON protocol call.
///
/// A base that already carries a query string is extended with `&`.
pub fn build_url(base: &str, params: &Parameters) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    let mut url = format!("{base}{separator}action={}", encode_value(params.action()));

    for (key, value) in params.iter() {
        match value {
            ParamValue::List(values) => {
                for value in values {
                    url.push_str(&format!("&{key}[]={}", encode_value(value)));
                }
            },
            ParamValue::Map(entries) => {
                for (sub, value) in entries {
                    url.push_str(&format!("&{key}[{sub}]={}", encode_value(value)));
                }
            },
            ParamValue::Scalar(value) if value.is_empty() => {},
            ParamValue::Scalar(value) => {
                url.push_str(&format!("&{key}={}", encode_value(value)));
            },
        }
    }

    url
}
