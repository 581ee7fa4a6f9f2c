use crate::ctype::{DefaultNaming, StructNaming};
use crate::generate::{generate_marshal_with, MarshalRequest};
use crate::indent::indent;
use crate::marshal::ITER_C_TYPE;
use crate::signature::SignatureError;

/// Assembles a complete C function around the marshalling code for
/// `signature`: the iterator and every recorded input become parameters
/// (in input-list order), recorded locals are declared up front, and the
/// body returns -1 on allocation failure and 0 on success.
pub fn marshal_function(
    signature: &str,
    fn_name: &str,
    iter_name: &str,
    name: &str,
) -> Result<String, SignatureError> {
    marshal_function_with(signature, fn_name, iter_name, name, &DefaultNaming)
}

pub fn marshal_function_with(
    signature: &str,
    fn_name: &str,
    iter_name: &str,
    name: &str,
    naming: &dyn StructNaming,
) -> Result<String, SignatureError> {
    let req = MarshalRequest {
        signature,
        iter_name,
        name,
        oom_code: "return -1;\n",
    };
    let out = generate_marshal_with(&req, naming)?;

    let mut params = format!("{ITER_C_TYPE} {iter_name}");
    for input in &out.inputs {
        params.push_str(", ");
        params.push_str(&input.c_type);
        params.push(' ');
        params.push_str(&input.name);
    }

    let mut code = format!("int {fn_name}({params}) {{\n");
    for local in &out.locals {
        code.push_str(&indent(&format!("{} {};\n", local.c_type, local.name), 1));
    }
    if !out.locals.is_empty() {
        code.push('\n');
    }
    code.push_str(&indent(&out.code, 1));
    code.push('\n');
    code.push_str(&indent("return 0;\n", 1));
    code.push_str("}\n");

    Ok(code)
}
