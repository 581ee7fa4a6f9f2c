use crate::signature::{Cursor, TypeTag};

/// Naming hook for aggregate projection. The generated marshalling code
/// projects struct members out of a pointed-to aggregate whose field
/// names must match whatever the companion structure-definition emitter
/// produced; implement this to line the two up.
pub trait StructNaming {
    /// C field name of member `index` of a struct or dict entry.
    fn member_field(&self, index: usize) -> String {
        format!("item{index}")
    }

    /// C type name of the aggregate for a struct or dict-entry
    /// sub-signature such as `(is)`.
    fn struct_c_type(&self, signature: &str) -> String {
        default_struct_c_type(signature)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNaming;

impl StructNaming for DefaultNaming {}

/// Runtime constant naming the current type in emitted calls.
pub fn type_constant(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Byte => "BUS_TYPE_BYTE",
        TypeTag::Boolean => "BUS_TYPE_BOOLEAN",
        TypeTag::Int16 => "BUS_TYPE_INT16",
        TypeTag::UInt16 => "BUS_TYPE_UINT16",
        TypeTag::Int32 => "BUS_TYPE_INT32",
        TypeTag::UInt32 => "BUS_TYPE_UINT32",
        TypeTag::Int64 => "BUS_TYPE_INT64",
        TypeTag::UInt64 => "BUS_TYPE_UINT64",
        TypeTag::Double => "BUS_TYPE_DOUBLE",
        TypeTag::UnixFd => "BUS_TYPE_UNIX_FD",
        TypeTag::String => "BUS_TYPE_STRING",
        TypeTag::ObjectPath => "BUS_TYPE_OBJECT_PATH",
        TypeTag::SignatureStr => "BUS_TYPE_SIGNATURE",
        TypeTag::Array => "BUS_TYPE_ARRAY",
        TypeTag::Struct => "BUS_TYPE_STRUCT",
        TypeTag::DictEntry => "BUS_TYPE_DICT_ENTRY",
        TypeTag::Variant => "BUS_TYPE_VARIANT",
    }
}

/// C type a value of the current signature element is held in. Arrays
/// and variants have no single value type; the generators never ask.
pub fn c_type_of(cursor: &Cursor, naming: &dyn StructNaming) -> String {
    let tag = cursor.current_tag();
    match tag {
        TypeTag::Byte => "uint8_t".to_string(),
        TypeTag::Boolean => "int".to_string(),
        TypeTag::Int16 => "int16_t".to_string(),
        TypeTag::UInt16 => "uint16_t".to_string(),
        TypeTag::Int32 => "int32_t".to_string(),
        TypeTag::UInt32 => "uint32_t".to_string(),
        TypeTag::Int64 => "int64_t".to_string(),
        TypeTag::UInt64 => "uint64_t".to_string(),
        TypeTag::Double => "double".to_string(),
        TypeTag::UnixFd => "int".to_string(),
        TypeTag::String | TypeTag::ObjectPath | TypeTag::SignatureStr => "char *".to_string(),
        TypeTag::Struct | TypeTag::DictEntry => {
            format!("{} *", naming.struct_c_type(cursor.subtree_text()))
        }
        TypeTag::Array | TypeTag::Variant => {
            unreachable!("no single C value type for {tag:?}")
        }
    }
}

/// Read-only qualifier, applied to pointer-valued types only: the
/// emitted code promises not to modify what the value points at.
pub fn to_const(c_type: &str) -> String {
    if c_type.ends_with('*') && !c_type.starts_with("const ") {
        format!("const {c_type}")
    } else {
        c_type.to_string()
    }
}

/// One additional level of indirection. An existing top-level pointer
/// becomes a const pointer before the new level is added.
pub fn to_pointer(c_type: &str) -> String {
    if c_type.ends_with('*') {
        format!("{c_type} const *")
    } else {
        format!("{c_type} *")
    }
}

fn default_struct_c_type(signature: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    mangle_single(signature.as_bytes(), &mut pos, &mut out);
    out
}

fn mangle_single(s: &[u8], pos: &mut usize, out: &mut String) {
    match s[*pos] {
        b'a' => {
            *pos += 1;
            out.push_str("Array");
            mangle_single(s, pos, out);
        }
        b'(' => {
            *pos += 1;
            out.push_str("Struct");
            while s[*pos] != b')' {
                mangle_single(s, pos, out);
            }
            *pos += 1;
        }
        b'{' => {
            *pos += 1;
            out.push_str("DictEntry");
            while s[*pos] != b'}' {
                mangle_single(s, pos, out);
            }
            *pos += 1;
        }
        code => {
            let name = match TypeTag::from_code(code) {
                Some(TypeTag::Byte) => "Byte",
                Some(TypeTag::Boolean) => "Boolean",
                Some(TypeTag::Int16) => "Int16",
                Some(TypeTag::UInt16) => "UInt16",
                Some(TypeTag::Int32) => "Int32",
                Some(TypeTag::UInt32) => "UInt32",
                Some(TypeTag::Int64) => "Int64",
                Some(TypeTag::UInt64) => "UInt64",
                Some(TypeTag::Double) => "Double",
                Some(TypeTag::UnixFd) => "UnixFd",
                Some(TypeTag::String) => "String",
                Some(TypeTag::ObjectPath) => "ObjectPath",
                Some(TypeTag::SignatureStr) => "Signature",
                Some(TypeTag::Variant) => "Variant",
                _ => unreachable!("mangling a validated signature"),
            };
            out.push_str(name);
            *pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{c_type_of, to_const, to_pointer, DefaultNaming, StructNaming};
    use crate::signature::Signature;

    #[test]
    fn const_only_qualifies_pointers() {
        assert_eq!(to_const("int32_t"), "int32_t");
        assert_eq!(to_const("char *"), "const char *");
        assert_eq!(to_const("size_t *"), "const size_t *");
        assert_eq!(to_const("const char * const *"), "const char * const *");
    }

    #[test]
    fn pointer_bumps_make_the_previous_level_const() {
        assert_eq!(to_pointer("int32_t"), "int32_t *");
        assert_eq!(to_pointer("const char *"), "const char * const *");
        assert_eq!(
            to_pointer("const int32_t *"),
            "const int32_t * const *"
        );
    }

    #[test]
    fn value_types_for_basic_elements() {
        let naming = DefaultNaming;
        for (sig, expected) in [
            ("y", "uint8_t"),
            ("b", "int"),
            ("i", "int32_t"),
            ("t", "uint64_t"),
            ("d", "double"),
            ("s", "char *"),
            ("o", "char *"),
        ] {
            let parsed = Signature::parse(sig).expect(sig);
            assert_eq!(c_type_of(&parsed.cursor(), &naming), expected, "{sig}");
        }
    }

    #[test]
    fn struct_types_are_mangled_pointers() {
        let naming = DefaultNaming;
        let sig = Signature::parse("(is)").expect("signature");
        assert_eq!(c_type_of(&sig.cursor(), &naming), "StructInt32String *");

        let sig = Signature::parse("a{ss}").expect("signature");
        let entry = sig.cursor().recurse();
        assert_eq!(c_type_of(&entry, &naming), "DictEntryStringString *");

        let sig = Signature::parse("(a(ii)x)").expect("signature");
        assert_eq!(
            c_type_of(&sig.cursor(), &naming),
            "StructArrayStructInt32Int32Int64 *"
        );
    }

    #[test]
    fn default_field_names_are_indexed() {
        assert_eq!(DefaultNaming.member_field(0), "item0");
        assert_eq!(DefaultNaming.member_field(7), "item7");
    }
}
