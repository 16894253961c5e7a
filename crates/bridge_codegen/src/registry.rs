//! Capability Registry
//!
//! Turns the static candidate catalog into schema descriptors. Discovery
//! degrades gracefully: an unmarked candidate or an unmappable member is
//! dropped with a warning so one problem never blocks generation for the
//! rest of the catalog.

use std::fmt;

use bridge_types::mapper::map_type;
use bridge_types::schema::{
    CapabilityDescriptor, MethodDescriptor, ParamDescriptor, SignalDescriptor,
};

use crate::candidate::{CapabilityCandidate, MemberDecl, MemberKind};

/// Non-fatal problems recorded during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverWarning {
    /// Candidate lacks the exposure marker and was skipped.
    ExposureMissing { native_name: String },
    /// A member was dropped because one of its types cannot be mapped.
    UnsupportedType {
        type_name: String,
        owner: String,
        member: String,
    },
}

impl fmt::Display for DiscoverWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverWarning::ExposureMissing { native_name } => {
                write!(f, "Capability {} is missing the exposure marker", native_name)
            }
            DiscoverWarning::UnsupportedType {
                type_name,
                owner,
                member,
            } => write!(f, "Unsupported type {} on {}::{}", type_name, owner, member),
        }
    }
}

/// Derive an export name from a native type name: strip a trailing `Api`
/// and lower-case the first character (`ExampleApi` -> `example`).
pub fn derive_export_name(native_name: &str) -> String {
    let stem = native_name.strip_suffix("Api").filter(|s| !s.is_empty()).unwrap_or(native_name);
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => "hostApi".to_string(),
    }
}

/// Name a parameter, falling back to a positional placeholder.
fn param_name(declared: Option<&str>, index: usize) -> String {
    match declared {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("arg{}", index),
    }
}

/// Map a member's parameter list. Returns the first unmappable type name on
/// failure so exactly one warning is recorded per dropped member.
fn map_params(member: &MemberDecl) -> Result<Vec<ParamDescriptor>, String> {
    let mut params = Vec::with_capacity(member.params.len());
    for (index, param) in member.params.iter().enumerate() {
        let descriptor =
            map_type(&param.native_type).map_err(|_| param.native_type.clone())?;
        params.push(ParamDescriptor {
            name: param_name(param.name.as_deref(), index),
            native_type: param.native_type.clone(),
            ts_type: descriptor.ts_type(),
        });
    }
    Ok(params)
}

/// Discover capability descriptors from the candidate catalog.
///
/// Returns the descriptors in catalog order plus every warning recorded
/// along the way. Warnings are diagnostic only; discovery never fails.
pub fn discover(
    candidates: &[CapabilityCandidate],
) -> (Vec<CapabilityDescriptor>, Vec<DiscoverWarning>) {
    let mut descriptors = Vec::new();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if !candidate.exposed {
            warnings.push(DiscoverWarning::ExposureMissing {
                native_name: candidate.native_name.clone(),
            });
            continue;
        }

        let export_name = candidate
            .export_name
            .clone()
            .unwrap_or_else(|| derive_export_name(&candidate.native_name));

        let mut methods = Vec::new();
        let mut signals = Vec::new();

        for member in &candidate.members {
            match member.kind {
                MemberKind::Signal => match map_params(member) {
                    Ok(params) => signals.push(SignalDescriptor {
                        name: member.name.clone(),
                        params,
                    }),
                    Err(type_name) => warnings.push(DiscoverWarning::UnsupportedType {
                        type_name,
                        owner: candidate.native_name.clone(),
                        member: member.name.clone(),
                    }),
                },
                MemberKind::Method => {
                    if !member.public {
                        continue;
                    }
                    let params = match map_params(member) {
                        Ok(params) => params,
                        Err(type_name) => {
                            warnings.push(DiscoverWarning::UnsupportedType {
                                type_name,
                                owner: candidate.native_name.clone(),
                                member: member.name.clone(),
                            });
                            continue;
                        }
                    };
                    let return_descriptor = match map_type(&member.return_type) {
                        Ok(descriptor) => descriptor,
                        Err(_) => {
                            warnings.push(DiscoverWarning::UnsupportedType {
                                type_name: member.return_type.clone(),
                                owner: candidate.native_name.clone(),
                                member: member.name.clone(),
                            });
                            continue;
                        }
                    };
                    methods.push(MethodDescriptor {
                        name: member.name.clone(),
                        return_type: member.return_type.clone(),
                        ts_return: return_descriptor.ts_type(),
                        returns_void: return_descriptor.is_void(),
                        params,
                    });
                }
            }
        }

        tracing::debug!(
            "Discovered capability {} ({}): {} methods, {} signals",
            export_name,
            candidate.native_name,
            methods.len(),
            signals.len()
        );

        descriptors.push(CapabilityDescriptor {
            name: export_name,
            native_name: candidate.native_name.clone(),
            methods,
            signals,
        });
    }

    (descriptors, warnings)
}
