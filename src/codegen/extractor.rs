//! Enumerating the exported method set of the target type.

use super::locator::NamedType;
use crate::errors::{GenError, Result};
use crate::golang::{is_exported, ResolvedPackage, TypeRef, Var};
use std::collections::HashSet;

/// One exported method with its full signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub pointer_receiver: bool,
}

/// Exported methods of `t`, pointer and value receivers merged, in
/// declaration order.
pub fn extract(pkg: &ResolvedPackage, t: &NamedType) -> Result<Vec<MethodSignature>> {
    let owner = method_owner(pkg, t)?;

    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    for decl in pkg.method_set(&owner).filter(|m| is_exported(&m.name)) {
        let qualified = format!("{}.{}", owner, decl.name);
        if !seen.insert(decl.name.clone()) {
            return Err(GenError::malformed(
                qualified,
                "declared more than once in the method set",
            ));
        }
        let signature = decl
            .signature
            .as_ref()
            .ok_or_else(|| GenError::malformed(&qualified, "no parameter list"))?;
        methods.push(MethodSignature {
            name: decl.name.clone(),
            params: signature.params.clone(),
            results: signature.results.clone(),
            pointer_receiver: decl.pointer_receiver,
        });
    }
    Ok(methods)
}

/// The defined type whose method declarations make up `t`'s method set.
fn method_owner(pkg: &ResolvedPackage, t: &NamedType) -> Result<String> {
    let mut name = t.name.clone();
    let mut target = &t.target;
    let mut is_alias = t.alias;
    let mut hops = 0;
    while is_alias {
        let TypeRef::Local { name: next, .. } = target else {
            return Err(GenError::no_methods(
                &t.name,
                "alias of a type declared outside this package",
            ));
        };
        let decl = pkg
            .type_decl(next)
            .ok_or_else(|| GenError::no_methods(&t.name, format!("{next} is not declared")))?;
        hops += 1;
        if hops > 64 {
            return Err(GenError::no_methods(&t.name, "alias cycle"));
        }
        name = next.clone();
        target = &decl.target;
        is_alias = decl.alias;
    }

    let underlying = pkg
        .type_decl(&name)
        .map(|d| d.underlying)
        .unwrap_or(t.underlying);
    if !underlying.can_bear_methods() {
        return Err(GenError::no_methods(
            &t.name,
            "underlying type is an interface or pointer type",
        ));
    }
    Ok(name)
}
