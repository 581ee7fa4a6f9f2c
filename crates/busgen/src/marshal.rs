//! Marshalling-code generation: walks a signature cursor and emits C
//! that serializes an appropriately typed value onto a bus message
//! iterator, while recording the input variables the emitted code reads
//! and the local variables it needs declared.

use crate::ctype::{c_type_of, to_const, to_pointer, type_constant, StructNaming};
use crate::indent::indent;
use crate::signature::{Cursor, TypeTag};
use crate::typevar::TypeVar;

/// C type of the bus message iterator in emitted code.
pub const ITER_C_TYPE: &str = "message_iter";

/// Generates C code marshalling the current element of `cursor` from a
/// variable named `name` into the iterator variable named `iter_name`.
///
/// The emitted code detects runtime allocation failure but does not know
/// how to recover; `oom_code` is inlined, one level deeper than the
/// failing call, wherever that happens.
///
/// Input variables the emitted code expects are appended to `inputs`;
/// every appended name begins with `name` and the first one is `name`
/// itself. Locals the code relies on the surrounding function declaring
/// are appended to `locals`. Insertion order in both lists is the
/// declaration order the caller must preserve.
pub fn marshal(
    cursor: &Cursor,
    naming: &dyn StructNaming,
    iter_name: &str,
    name: &str,
    oom_code: &str,
    inputs: &mut Vec<TypeVar>,
    locals: &mut Vec<TypeVar>,
) -> String {
    let tag = cursor.current_tag();
    if tag.is_basic() {
        marshal_basic(cursor, naming, iter_name, name, oom_code, inputs)
    } else {
        match tag {
            TypeTag::Array => {
                marshal_array(cursor, naming, iter_name, name, oom_code, inputs, locals)
            }
            TypeTag::Struct | TypeTag::DictEntry => {
                marshal_struct(cursor, naming, iter_name, name, oom_code, inputs, locals)
            }
            other => unreachable!("non-marshallable type tag {other:?}"),
        }
    }
}

fn marshal_basic(
    cursor: &Cursor,
    naming: &dyn StructNaming,
    iter_name: &str,
    name: &str,
    oom_code: &str,
    inputs: &mut Vec<TypeVar>,
) -> String {
    let oom_block = indent(oom_code, 1);
    let c_type = to_const(&c_type_of(cursor, naming));
    let constant = type_constant(cursor.current_tag());

    let code = format!(
        "/* Marshal a {c_type} onto the message */\n\
         if (!append_basic(&{iter_name}, {constant}, &{name})) {{\n\
         {oom_block}\
         }}\n"
    );

    inputs.push(TypeVar::new(c_type, name));

    code
}

fn marshal_array(
    cursor: &Cursor,
    naming: &dyn StructNaming,
    iter_name: &str,
    name: &str,
    oom_code: &str,
    inputs: &mut Vec<TypeVar>,
    locals: &mut Vec<TypeVar>,
) -> String {
    let array_iter_name = format!("{name}_iter");
    let loop_name = format!("{name}_i");
    let element_name = format!("{name}_element");
    let oom_block = indent(oom_code, 1);

    let element = cursor.recurse();
    let element_tag = element.current_tag();
    let element_sig = element.subtree_text();

    // Opening the container needs the element signature and a local for
    // the recursed iterator.
    let mut code = format!(
        "/* Marshal an array onto the message */\n\
         if (!open_container(&{iter_name}, BUS_TYPE_ARRAY, \"{element_sig}\", &{array_iter_name})) {{\n\
         {oom_block}\
         }}\n\
         \n"
    );

    locals.push(TypeVar::new(ITER_C_TYPE, array_iter_name.clone()));

    // Fixed-width elements have no in-band terminator, so the length
    // arrives as an extra input; everything else iterates up to the
    // sentinel slot.
    if element_tag.is_fixed() {
        code.push_str(&format!(
            "for (size_t {loop_name} = 0; {loop_name} < {name}_len; {loop_name}++) {{\n"
        ));
    } else {
        code.push_str(&format!(
            "for (size_t {loop_name} = 0; {name}[{loop_name}]; {loop_name}++) {{\n"
        ));
    }

    let mut element_inputs = Vec::new();
    let mut element_locals = Vec::new();
    let element_block = marshal(
        &element,
        naming,
        &array_iter_name,
        &element_name,
        oom_code,
        &mut element_inputs,
        &mut element_locals,
    );

    // Each element input equates to one of our own inputs with one more
    // level of pointers, keeping the suffix; the original record turns
    // into a loop-body local assigned from the array every iteration.
    let mut assign_block = String::new();
    for element_input in element_inputs {
        let outer = TypeVar::suffixed(
            to_const(&to_pointer(&element_input.c_type)),
            name,
            &element_input.suffix,
        );
        assign_block.push_str(&format!(
            "{} = {}[{}];\n",
            element_input.name, outer.name, loop_name
        ));
        inputs.push(outer);
        element_locals.push(element_input);
    }

    let mut vars_block = String::new();
    for local in &element_locals {
        vars_block.push_str(&format!("{} {};\n", local.c_type, local.name));
    }

    code.push_str(&indent(&vars_block, 1));
    code.push('\n');
    code.push_str(&indent(&assign_block, 1));
    code.push('\n');
    code.push_str(&indent(&element_block, 1));

    code.push_str(&format!(
        "}}\n\
         \n\
         if (!close_container(&{iter_name}, &{array_iter_name})) {{\n\
         {oom_block}\
         }}\n"
    ));

    // The length input comes after all element-derived inputs so the
    // array pointer leads the argument list.
    if element_tag.is_fixed() {
        inputs.push(TypeVar::suffixed("size_t", name, "_len"));
    }

    code
}

fn marshal_struct(
    cursor: &Cursor,
    naming: &dyn StructNaming,
    iter_name: &str,
    name: &str,
    oom_code: &str,
    inputs: &mut Vec<TypeVar>,
    locals: &mut Vec<TypeVar>,
) -> String {
    let struct_iter_name = format!("{name}_iter");
    let oom_block = indent(oom_code, 1);
    let constant = type_constant(cursor.current_tag());
    let c_type = to_const(&c_type_of(cursor, naming));

    // Structs and dict entries open with their own constant but no
    // signature; the payload signature is implicit in the outer context.
    let mut code = format!(
        "/* Marshal a structure onto the message */\n\
         if (!open_container(&{iter_name}, {constant}, NULL, &{struct_iter_name})) {{\n\
         {oom_block}\
         }}\n\
         \n"
    );

    locals.push(TypeVar::new(ITER_C_TYPE, struct_iter_name.clone()));

    let mut member = cursor.recurse();
    let mut index = 0usize;
    loop {
        let field = naming.member_field(index);
        let item_name = format!("{name}_{field}");

        let mut item_inputs = Vec::new();
        let mut item_locals = Vec::new();
        let item_code = marshal(
            &member,
            naming,
            &struct_iter_name,
            &item_name,
            oom_code,
            &mut item_inputs,
            &mut item_locals,
        );

        locals.append(&mut item_locals);

        // Members are projected out of the aggregate rather than
        // demanded as separate inputs, so every item input becomes a
        // local filled in before its marshalling block runs.
        for item_input in item_inputs {
            code.push_str(&format!(
                "{} = {}->{}{};\n",
                item_input.name, name, field, item_input.suffix
            ));
            locals.push(item_input);
        }

        code.push('\n');
        code.push_str(&item_code);
        code.push('\n');

        index += 1;
        if !member.next() {
            break;
        }
    }

    code.push_str(&format!(
        "if (!close_container(&{iter_name}, &{struct_iter_name})) {{\n\
         {oom_block}\
         }}\n"
    ));

    inputs.push(TypeVar::new(c_type, name));

    code
}

#[cfg(test)]
mod tests {
    use super::marshal;
    use crate::ctype::DefaultNaming;
    use crate::signature::Signature;
    use crate::typevar::TypeVar;

    fn run(sig: &str) -> (String, Vec<TypeVar>, Vec<TypeVar>) {
        let signature = Signature::parse(sig).expect("signature");
        let mut inputs = Vec::new();
        let mut locals = Vec::new();
        let code = marshal(
            &signature.cursor(),
            &DefaultNaming,
            "iter",
            "value",
            "return -1;\n",
            &mut inputs,
            &mut locals,
        );
        (code, inputs, locals)
    }

    #[test]
    fn basic_input_is_the_value_itself() {
        let (code, inputs, locals) = run("u");
        assert!(code.contains("append_basic(&iter, BUS_TYPE_UINT32, &value)"));
        assert_eq!(inputs, vec![TypeVar::new("uint32_t", "value")]);
        assert!(locals.is_empty());
    }

    #[test]
    fn fixed_array_gets_a_trailing_length_input() {
        let (_, inputs, _) = run("ad");
        assert_eq!(
            inputs,
            vec![
                TypeVar::new("const double *", "value"),
                TypeVar::suffixed("size_t", "value", "_len"),
            ]
        );
    }

    #[test]
    fn string_array_iterates_to_the_sentinel() {
        let (code, inputs, _) = run("as");
        assert!(code.contains("for (size_t value_i = 0; value[value_i]; value_i++) {"));
        assert_eq!(inputs, vec![TypeVar::new("const char * const *", "value")]);
    }

    #[test]
    fn nested_fixed_arrays_bump_the_length_pointer() {
        let (_, inputs, _) = run("aai");
        assert_eq!(
            inputs,
            vec![
                TypeVar::new("const int32_t * const *", "value"),
                TypeVar::suffixed("const size_t *", "value", "_len"),
            ]
        );
    }

    #[test]
    fn struct_members_become_locals_not_inputs() {
        let (code, inputs, locals) = run("(is)");
        assert_eq!(
            inputs,
            vec![TypeVar::new("const StructInt32String *", "value")]
        );
        assert_eq!(
            locals,
            vec![
                TypeVar::new("message_iter", "value_iter"),
                TypeVar::new("int32_t", "value_item0"),
                TypeVar::new("const char *", "value_item1"),
            ]
        );
        assert!(code.contains("value_item0 = value->item0;\n"));
        assert!(code.contains("value_item1 = value->item1;\n"));
    }

    #[test]
    fn struct_with_array_member_projects_the_length_too() {
        let (code, _, locals) = run("(ai)");
        assert!(code.contains("value_item0 = value->item0;\n"));
        assert!(code.contains("value_item0_len = value->item0_len;\n"));
        assert!(locals.contains(&TypeVar::suffixed("size_t", "value_item0", "_len")));
    }

    #[test]
    fn dict_entry_array_opens_with_the_entry_constant() {
        let (code, inputs, _) = run("a{ss}");
        assert!(code.contains("open_container(&value_iter, BUS_TYPE_DICT_ENTRY, NULL, &value_element_iter)"));
        assert_eq!(
            inputs,
            vec![TypeVar::new("const DictEntryStringString * const *", "value")]
        );
    }
}
