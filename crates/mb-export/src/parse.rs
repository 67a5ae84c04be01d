use anyhow::{Context, Result};

/// Tableau extrait d'un texte source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedArray {
    /// Identifiant portant le suffixe `_{W}x{H}`, s'il existe.
    pub name: Option<String>,
    /// Dimensions déduites du suffixe `_{W}x{H}`.
    pub dimensions: Option<(u32, u32)>,
    /// Octets de l'initialiseur, dans l'ordre.
    pub bytes: Vec<u8>,
}

/// Parse a C or Rust array declaration, or a bare list of byte literals.
///
/// Dimensions are read from an identifier such as `bit_map_64x32`.
///
/// # Errors
/// Returns an error if a literal is malformed or exceeds 255.
///
/// # Example
/// ```
/// use mb_export::parse::parse_array;
/// let parsed = parse_array("const unsigned char bit_map_16x1[] = { 0x80, 0x00 };").unwrap();
/// assert_eq!(parsed.dimensions, Some((16, 1)));
/// assert_eq!(parsed.bytes, vec![0x80, 0x00]);
/// ```
pub fn parse_array(text: &str) -> Result<ParsedArray> {
    let text = strip_comments(text);
    let (decl, body) = match text.split_once('=') {
        Some((decl, body)) => (decl, body),
        None => ("", text.as_str()),
    };

    let named = tokens(decl).find_map(|t| dimensions_suffix(t).map(|dims| (t.to_string(), dims)));
    let bytes = parse_tokens(body)?;

    Ok(ParsedArray {
        name: named.as_ref().map(|(name, _)| name.clone()),
        dimensions: named.map(|(_, dims)| dims),
        bytes,
    })
}

/// Extract every byte literal of an initialiser.
///
/// # Errors
/// Returns an error if a literal is malformed or exceeds 255.
///
/// # Example
/// ```
/// use mb_export::parse::parse_bytes;
/// assert_eq!(parse_bytes("0xAA, 0b0000_0001, 255u8").unwrap(), vec![0xAA, 0x01, 0xFF]);
/// assert!(parse_bytes("0x100").is_err());
/// ```
pub fn parse_bytes(text: &str) -> Result<Vec<u8>> {
    parse_array(text).map(|parsed| parsed.bytes)
}

fn parse_tokens(body: &str) -> Result<Vec<u8>> {
    tokens(body)
        .enumerate()
        .map(|(i, token)| {
            parse_literal(token).with_context(|| format!("Octet {i} invalide : « {token} »"))
        })
        .collect()
}

/// Les signes restent dans le token : `-1` doit échouer, pas devenir `1`.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .filter(|t| !t.is_empty())
}

fn parse_literal(token: &str) -> Result<u8> {
    if token.contains(['-', '+']) {
        anyhow::bail!("littéral signé");
    }
    let digits = token.strip_suffix("u8").unwrap_or(token).replace('_', "");
    let (radix, digits) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        _ => (10, digits.as_str()),
    };
    if digits.is_empty() {
        anyhow::bail!("littéral vide");
    }
    let value = u32::from_str_radix(digits, radix).context("littéral non numérique")?;
    u8::try_from(value).with_context(|| format!("{value} dépasse 255"))
}

/// `bit_map_64x32` → `Some((64, 32))`.
fn dimensions_suffix(ident: &str) -> Option<(u32, u32)> {
    let (_, suffix) = ident.rsplit_once('_')?;
    let (w, h) = suffix.split_once(['x', 'X'])?;
    if w.is_empty() || h.is_empty() {
        return None;
    }
    Some((w.parse().ok()?, h.parse().ok()?))
}

/// Retire les commentaires `//` et `/* */`.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |i| &after[i..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |i| &after[i + 2..]);
            out.push(' ');
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_c_array_with_comments() {
        let text = "// 2 frame(s), 8x1\n\
                    const unsigned char anim_8x1[2][1] = {\n  { 0x01 }, /* frame 1 */\n  { 0x80 },\n};\n";
        let parsed = parse_array(text).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("anim_8x1"));
        assert_eq!(parsed.dimensions, Some((8, 1)));
        assert_eq!(parsed.bytes, vec![0x01, 0x80]);
    }

    #[test]
    fn parses_rust_array() {
        let text = "pub const LOGO_16X2: [u8; 4] = [\n    0xFF, 0x00,\n    0x0F, 0xF0\n];\n";
        let parsed = parse_array(text).unwrap();
        assert_eq!(parsed.dimensions, Some((16, 2)));
        assert_eq!(parsed.bytes, vec![0xFF, 0x00, 0x0F, 0xF0]);
    }

    #[test]
    fn bare_list_has_no_dimensions() {
        let parsed = parse_array("0x01,0x02 , 3\n4").unwrap();
        assert_eq!(parsed.dimensions, None);
        assert_eq!(parsed.name, None);
        assert_eq!(parsed.bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn rejects_garbage_literal() {
        assert!(parse_bytes("0xAA, 0xZZ").is_err());
        assert!(parse_bytes("0x").is_err());
        assert!(parse_bytes("256").is_err());
    }

    #[test]
    fn rejects_signed_literals() {
        assert!(parse_bytes("{ -1, 2 }").is_err());
        assert!(parse_bytes("{ +1, 2 }").is_err());
        assert!(parse_bytes("0x-1").is_err());
        assert!(parse_array("const unsigned char bit_map_8x1[] = { 0x01, -0x80 };").is_err());
    }

    #[test]
    fn suffix_detection() {
        assert_eq!(dimensions_suffix("bit_map_128x64"), Some((128, 64)));
        assert_eq!(dimensions_suffix("bit_map"), None);
        assert_eq!(dimensions_suffix("icon_x8"), None);
        assert_eq!(dimensions_suffix("nounderscore8x8"), None);
    }

    #[test]
    fn unterminated_block_comment_drops_rest() {
        assert_eq!(parse_bytes("0x01 /* 0x02, 0x03").unwrap(), vec![0x01]);
    }
}
