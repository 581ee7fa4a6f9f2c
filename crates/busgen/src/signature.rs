use std::fmt;

/// One element of the bus type grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    UnixFd,
    String,
    ObjectPath,
    SignatureStr,
    Array,
    Struct,
    DictEntry,
    Variant,
}

impl TypeTag {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'y' => Some(TypeTag::Byte),
            b'b' => Some(TypeTag::Boolean),
            b'n' => Some(TypeTag::Int16),
            b'q' => Some(TypeTag::UInt16),
            b'i' => Some(TypeTag::Int32),
            b'u' => Some(TypeTag::UInt32),
            b'x' => Some(TypeTag::Int64),
            b't' => Some(TypeTag::UInt64),
            b'd' => Some(TypeTag::Double),
            b'h' => Some(TypeTag::UnixFd),
            b's' => Some(TypeTag::String),
            b'o' => Some(TypeTag::ObjectPath),
            b'g' => Some(TypeTag::SignatureStr),
            b'a' => Some(TypeTag::Array),
            b'(' => Some(TypeTag::Struct),
            b'{' => Some(TypeTag::DictEntry),
            b'v' => Some(TypeTag::Variant),
            _ => None,
        }
    }

    /// Appended to a message by a single `append_basic` call.
    pub fn is_basic(self) -> bool {
        matches!(
            self,
            TypeTag::Byte
                | TypeTag::Boolean
                | TypeTag::Int16
                | TypeTag::UInt16
                | TypeTag::Int32
                | TypeTag::UInt32
                | TypeTag::Int64
                | TypeTag::UInt64
                | TypeTag::Double
                | TypeTag::UnixFd
                | TypeTag::String
                | TypeTag::ObjectPath
                | TypeTag::SignatureStr
        )
    }

    /// Occupies a statically known number of bytes on the wire. Strings
    /// are basic but not fixed.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            TypeTag::Byte
                | TypeTag::Boolean
                | TypeTag::Int16
                | TypeTag::UInt16
                | TypeTag::Int32
                | TypeTag::UInt32
                | TypeTag::Int64
                | TypeTag::UInt64
                | TypeTag::Double
                | TypeTag::UnixFd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureErrorKind {
    Parse,
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct SignatureError {
    pub kind: SignatureErrorKind,
    pub message: String,
}

impl SignatureError {
    pub fn new(kind: SignatureErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    fn parse(message: String) -> Self {
        Self::new(SignatureErrorKind::Parse, message)
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SignatureErrorKind::Parse => write!(f, "invalid signature: {}", self.message),
            SignatureErrorKind::Unsupported => {
                write!(f, "unsupported signature: {}", self.message)
            }
        }
    }
}

impl std::error::Error for SignatureError {}

/// A validated type signature. Cursors over it never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    text: String,
}

impl Signature {
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Err(SignatureError::parse("signature is empty".to_string()));
        }
        let mut pos = 0;
        while pos < bytes.len() {
            pos = validate_single(bytes, pos, false)?;
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor positioned at the first complete type.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            sig: &self.text,
            pos: 0,
        }
    }

    /// Variants carry their payload type at runtime, so no static
    /// marshalling code exists for them.
    pub fn contains_variant(&self) -> bool {
        self.text.contains('v')
    }
}

fn validate_single(s: &[u8], pos: usize, under_array: bool) -> Result<usize, SignatureError> {
    match s.get(pos).copied() {
        None => Err(SignatureError::parse("truncated signature".to_string())),
        Some(b'a') => validate_single(s, pos + 1, true),
        Some(b'(') => {
            let mut p = pos + 1;
            if s.get(p).copied() == Some(b')') {
                return Err(SignatureError::parse(
                    "struct must have at least one member".to_string(),
                ));
            }
            loop {
                p = validate_single(s, p, false)?;
                match s.get(p).copied() {
                    Some(b')') => return Ok(p + 1),
                    None => {
                        return Err(SignatureError::parse("unterminated struct".to_string()))
                    }
                    Some(_) => {}
                }
            }
        }
        Some(b'{') => {
            if !under_array {
                return Err(SignatureError::parse(
                    "dict entry is only valid as an array element".to_string(),
                ));
            }
            let key_basic = s
                .get(pos + 1)
                .and_then(|&c| TypeTag::from_code(c))
                .map(TypeTag::is_basic)
                .unwrap_or(false);
            if !key_basic {
                return Err(SignatureError::parse(
                    "dict entry key must be a basic type".to_string(),
                ));
            }
            let p = validate_single(s, pos + 1, false)?;
            let p = validate_single(s, p, false)?;
            match s.get(p).copied() {
                Some(b'}') => Ok(p + 1),
                None => Err(SignatureError::parse(
                    "unterminated dict entry".to_string(),
                )),
                Some(_) => Err(SignatureError::parse(
                    "dict entry must have exactly two members".to_string(),
                )),
            }
        }
        Some(code) => match TypeTag::from_code(code) {
            Some(_) => Ok(pos + 1),
            None => Err(SignatureError::parse(format!(
                "unknown type code {:?}",
                code as char
            ))),
        },
    }
}

/// Read-only positional pointer into a validated signature.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    sig: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn current_tag(&self) -> TypeTag {
        match TypeTag::from_code(self.sig.as_bytes()[self.pos]) {
            Some(tag) => tag,
            None => unreachable!("cursor positioned inside a validated signature"),
        }
    }

    /// Child cursor at the first member of the current container (the
    /// element type of an array, the first field of a struct or dict
    /// entry).
    pub fn recurse(&self) -> Cursor<'a> {
        Cursor {
            sig: self.sig,
            pos: self.pos + 1,
        }
    }

    /// Advances to the next sibling; returns false (leaving the cursor
    /// in place) when the current type is the last one.
    pub fn next(&mut self) -> bool {
        let end = single_type_end(self.sig.as_bytes(), self.pos);
        match self.sig.as_bytes().get(end).copied() {
            None | Some(b')') | Some(b'}') => false,
            Some(_) => {
                self.pos = end;
                true
            }
        }
    }

    /// Textual sub-signature of the current complete type.
    pub fn subtree_text(&self) -> &'a str {
        &self.sig[self.pos..single_type_end(self.sig.as_bytes(), self.pos)]
    }
}

fn single_type_end(s: &[u8], pos: usize) -> usize {
    match s[pos] {
        b'a' => single_type_end(s, pos + 1),
        b'(' => {
            let mut p = pos + 1;
            while s[p] != b')' {
                p = single_type_end(s, p);
            }
            p + 1
        }
        b'{' => {
            let mut p = pos + 1;
            while s[p] != b'}' {
                p = single_type_end(s, p);
            }
            p + 1
        }
        _ => pos + 1,
    }
}
