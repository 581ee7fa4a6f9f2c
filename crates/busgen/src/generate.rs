use crate::ctype::{DefaultNaming, StructNaming};
use crate::marshal;
use crate::signature::{Signature, SignatureError, SignatureErrorKind};
use crate::typevar::TypeVar;

/// One marshalling-generation request.
#[derive(Debug, Clone)]
pub struct MarshalRequest<'a> {
    pub signature: &'a str,
    pub iter_name: &'a str,
    pub name: &'a str,
    pub oom_code: &'a str,
}

impl<'a> MarshalRequest<'a> {
    pub fn new(signature: &'a str) -> Self {
        Self {
            signature,
            iter_name: "iter",
            name: "value",
            oom_code: "return -1;\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarshalOutput {
    pub code: String,
    pub inputs: Vec<TypeVar>,
    pub locals: Vec<TypeVar>,
}

pub fn generate_marshal(req: &MarshalRequest) -> Result<MarshalOutput, SignatureError> {
    generate_marshal_with(req, &DefaultNaming)
}

/// Validates the request's signature and runs the marshalling
/// generators over it. Output is deterministic byte-for-byte for a
/// given request.
pub fn generate_marshal_with(
    req: &MarshalRequest,
    naming: &dyn StructNaming,
) -> Result<MarshalOutput, SignatureError> {
    let signature = Signature::parse(req.signature)?;

    if signature.contains_variant() {
        return Err(SignatureError::new(
            SignatureErrorKind::Unsupported,
            format!(
                "variant in signature {:?}: variants carry their type at runtime and have no static marshalling",
                req.signature
            ),
        ));
    }

    let mut cursor = signature.cursor();
    if cursor.next() {
        return Err(SignatureError::new(
            SignatureErrorKind::Parse,
            format!(
                "signature {:?} must be a single complete type",
                req.signature
            ),
        ));
    }

    let mut inputs = Vec::new();
    let mut locals = Vec::new();
    let code = marshal::marshal(
        &signature.cursor(),
        naming,
        req.iter_name,
        req.name,
        req.oom_code,
        &mut inputs,
        &mut locals,
    );

    Ok(MarshalOutput {
        code,
        inputs,
        locals,
    })
}
