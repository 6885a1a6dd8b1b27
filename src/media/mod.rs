//! Maileon media types.

use mime::Mime;
use once_cell::sync::Lazy;

/// Default media type for requests and responses.
pub static MAILEON_XML: Lazy<Mime> = Lazy::new(|| {
    "application/vnd.maileon.api+xml; charset=utf-8"
        .parse()
        .expect("static media type is valid")
});

/// JSON variant of the Maileon media type.
pub static MAILEON_JSON: Lazy<Mime> = Lazy::new(|| {
    "application/vnd.maileon.api+json"
        .parse()
        .expect("static media type is valid")
});

/// Returns true when two media types are compatible.
///
/// A wildcard type or subtype on either side matches anything; otherwise type,
/// subtype and structured suffix must agree. Parameters are ignored.
pub fn is_compatible(a: &Mime, b: &Mime) -> bool {
    if a.type_() == mime::STAR || b.type_() == mime::STAR {
        return true;
    }
    if a.type_() != b.type_() {
        return false;
    }
    if a.subtype() == mime::STAR || b.subtype() == mime::STAR {
        return true;
    }
    a.subtype() == b.subtype() && a.suffix() == b.suffix()
}
