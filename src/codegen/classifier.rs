//! Per-method wrapper shape: header parameters, call arguments, and whether
//! the trailing result is captured as the sticky error.

use super::extractor::MethodSignature;
use super::imports::ImportSet;
use crate::golang::{ExternalType, Var};
use serde::Serialize;
use std::collections::HashSet;

/// Everything the renderer needs for one wrapper method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrapperMethod {
    pub name: String,
    /// Receiver variable of the wrapper method
    pub receiver: String,
    /// Parameter list of the wrapper header, without parentheses
    pub params: String,
    /// Argument list of the forwarded call, without parentheses
    pub args: String,
    /// Assignment target for the call's results, `None` for a bare call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    pub error_convention: bool,
}

/// A method follows the error convention when it has at least one result
/// and the last result is the predeclared `error` type.
pub fn has_error_convention(method: &MethodSignature) -> bool {
    method
        .results
        .last()
        .is_some_and(|last| last.ty.is_universal_error())
}

/// Shape one method. Every external type in its parameters must already be
/// recorded in `imports`.
pub fn classify(method: &MethodSignature, imports: &ImportSet) -> WrapperMethod {
    let qualify = |ext: &ExternalType| imports.qualifier_for(ext);
    let arguments: Vec<String> = method
        .params
        .iter()
        .filter_map(|param| call_argument(param, &qualify))
        .collect();
    let receiver = receiver_name(method, imports, &arguments);

    let params = method
        .params
        .iter()
        .map(|param| {
            let name = param.name.as_deref().unwrap_or("_");
            let ty = param.ty.render(&qualify);
            if param.variadic {
                format!("{name} ...{ty}")
            } else {
                format!("{name} {ty}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let args = arguments.join(", ");

    let error_convention = has_error_convention(method);
    let returns = error_convention.then(|| {
        let mut targets = vec!["_".to_string(); method.results.len() - 1];
        targets.push(format!("{receiver}.Err"));
        targets.join(", ")
    });

    WrapperMethod {
        name: method.name.clone(),
        receiver,
        params,
        args,
        returns,
        error_convention,
    }
}

fn call_argument(param: &Var, qualify: &dyn Fn(&ExternalType) -> String) -> Option<String> {
    match (&param.name, param.variadic) {
        (Some(name), true) => Some(format!("{name}...")),
        (Some(name), false) => Some(name.clone()),
        // an unnamed variadic parameter forwards an empty list
        (None, true) => None,
        (None, false) => Some(param.ty.zero_value(qualify)),
    }
}

/// `p`, unless a parameter, an import qualifier or an identifier inside a
/// forwarded zero value already uses it.
fn receiver_name(method: &MethodSignature, imports: &ImportSet, arguments: &[String]) -> String {
    let mut taken: HashSet<&str> = method.params.iter().filter_map(|p| p.name.as_deref()).collect();
    taken.extend(arguments.iter().flat_map(|arg| identifiers(arg)));
    let free = |candidate: &str| !taken.contains(candidate) && !imports.is_qualifier(candidate);
    if free("p") {
        return "p".to_string();
    }
    (0..)
        .map(|n| format!("p{n}"))
        .find(|candidate| free(candidate.as_str()))
        .unwrap_or_else(|| "p".to_string())
}

fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().next().is_some_and(|c| !c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golang::{BasicKind, TypeRef};
    use pretty_assertions::assert_eq;

    fn var(name: Option<&str>, ty: TypeRef) -> Var {
        Var {
            name: name.map(Into::into),
            ty,
            variadic: false,
        }
    }

    fn method(name: &str, params: Vec<Var>, results: Vec<TypeRef>) -> MethodSignature {
        MethodSignature {
            name: name.into(),
            params,
            results: results.into_iter().map(|ty| var(None, ty)).collect(),
            pointer_receiver: true,
        }
    }

    fn int() -> TypeRef {
        TypeRef::Basic(BasicKind::Int)
    }

    #[test]
    fn test_error_convention_requires_trailing_error() {
        assert!(!has_error_convention(&method("A", vec![], vec![])));
        assert!(has_error_convention(&method("B", vec![], vec![TypeRef::Error])));
        assert!(has_error_convention(&method("C", vec![], vec![int(), TypeRef::Error])));
        assert!(!has_error_convention(&method("D", vec![], vec![TypeRef::Error, int()])));

        let shadowed = TypeRef::Local {
            name: "error".into(),
            underlying: crate::golang::Underlying::Composite,
        };
        assert!(!has_error_convention(&method("E", vec![], vec![shadowed])));
    }

    #[test]
    fn test_returns_discard_all_but_error() {
        let imports = ImportSet::default();
        let m = classify(
            &method("M", vec![], vec![TypeRef::Basic(BasicKind::String), int(), TypeRef::Error]),
            &imports,
        );
        assert_eq!(m.returns.as_deref(), Some("_, _, p.Err"));

        let single = classify(&method("S", vec![], vec![TypeRef::Error]), &imports);
        assert_eq!(single.returns.as_deref(), Some("p.Err"));

        let bare = classify(&method("B", vec![], vec![int()]), &imports);
        assert_eq!(bare.returns, None);
        assert!(!bare.error_convention);
    }

    #[test]
    fn test_unnamed_params_pass_zero_values() {
        let imports = ImportSet::default();
        let m = classify(
            &method(
                "Write",
                vec![
                    var(None, TypeRef::Slice(Box::new(TypeRef::Basic(BasicKind::Byte)))),
                    var(None, TypeRef::Basic(BasicKind::Bool)),
                ],
                vec![TypeRef::Error],
            ),
            &imports,
        );
        assert_eq!(m.params, "_ []byte, _ bool");
        assert_eq!(m.args, "nil, false");
    }

    #[test]
    fn test_variadic_params_are_spread() {
        let imports = ImportSet::default();
        let mut rest = var(Some("rest"), TypeRef::Universe("any".into()));
        rest.variadic = true;
        let m = classify(
            &method("Printf", vec![var(Some("format"), TypeRef::Basic(BasicKind::String)), rest], vec![]),
            &imports,
        );
        assert_eq!(m.params, "format string, rest ...any");
        assert_eq!(m.args, "format, rest...");
    }

    #[test]
    fn test_receiver_avoids_parameter_names() {
        let imports = ImportSet::default();
        let m = classify(
            &method("Set", vec![var(Some("p"), int()), var(Some("p0"), int())], vec![TypeRef::Error]),
            &imports,
        );
        assert_eq!(m.receiver, "p1");
        assert_eq!(m.returns.as_deref(), Some("p1.Err"));
    }

    #[test]
    fn test_receiver_avoids_types_named_in_zero_values() {
        let imports = ImportSet::default();
        let local = |name: &str| TypeRef::Local {
            name: name.into(),
            underlying: crate::golang::Underlying::Basic(BasicKind::Int),
        };
        let m = classify(
            &method("Scale", vec![var(None, local("p")), var(None, local("p0"))], vec![TypeRef::Error]),
            &imports,
        );
        assert_eq!(m.args, "p(0), p0(0)");
        assert_eq!(m.receiver, "p1");
        assert_eq!(m.returns.as_deref(), Some("p1.Err"));
    }
}
