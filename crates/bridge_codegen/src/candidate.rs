//! Capability candidates
//!
//! The statically maintained declaration of a native object offered for
//! exposure: its type name, exposure marker, optional export-name override,
//! and member signatures as native type-name strings. Discovery runs over a
//! deliberate registry table of these declarations, not dynamic scanning.

/// Kind of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Invokable method (request/response)
    Method,
    /// One-way notification emitted by the capability
    Signal,
}

/// A declared parameter: optional name plus native type.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub native_type: String,
}

/// A declared member of a capability candidate.
#[derive(Debug, Clone)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    /// Non-public members never reach the schema.
    pub public: bool,
    pub params: Vec<ParamDecl>,
    pub return_type: String,
}

impl MemberDecl {
    /// Declare a public method returning nothing.
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            public: true,
            params: Vec::new(),
            return_type: "()".to_string(),
        }
    }

    /// Declare a signal.
    pub fn signal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Signal,
            public: true,
            params: Vec::new(),
            return_type: "()".to_string(),
        }
    }

    /// Add a named parameter.
    pub fn param(mut self, name: impl Into<String>, native_type: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: Some(name.into()),
            native_type: native_type.into(),
        });
        self
    }

    /// Add an unnamed parameter (gets a positional `arg{i}` placeholder).
    pub fn unnamed_param(mut self, native_type: impl Into<String>) -> Self {
        self.params.push(ParamDecl {
            name: None,
            native_type: native_type.into(),
        });
        self
    }

    /// Set the return type.
    pub fn returns(mut self, native_type: impl Into<String>) -> Self {
        self.return_type = native_type.into();
        self
    }

    /// Mark the member non-public.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// A native object offered for exposure discovery.
#[derive(Debug, Clone)]
pub struct CapabilityCandidate {
    /// Native type name (e.g. `ExampleApi`)
    pub native_name: String,
    /// Explicit export-name override
    pub export_name: Option<String>,
    /// Explicit exposure marker; unmarked candidates are skipped.
    pub exposed: bool,
    pub members: Vec<MemberDecl>,
}

impl CapabilityCandidate {
    /// Declare a new, unmarked candidate.
    pub fn new(native_name: impl Into<String>) -> Self {
        Self {
            native_name: native_name.into(),
            export_name: None,
            exposed: false,
            members: Vec::new(),
        }
    }

    /// Carry the exposure marker.
    pub fn exposed(mut self) -> Self {
        self.exposed = true;
        self
    }

    /// Override the derived export name.
    pub fn with_export_name(mut self, name: impl Into<String>) -> Self {
        self.export_name = Some(name.into());
        self
    }

    /// Add a declared member.
    pub fn member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    /// Convenience: add a public method with named parameters.
    pub fn method(
        self,
        name: &str,
        params: &[(&str, &str)],
        return_type: &str,
    ) -> Self {
        let mut decl = MemberDecl::method(name).returns(return_type);
        for (param_name, native_type) in params {
            decl = decl.param(*param_name, *native_type);
        }
        self.member(decl)
    }

    /// Convenience: add a signal with named parameters.
    pub fn signal(self, name: &str, params: &[(&str, &str)]) -> Self {
        let mut decl = MemberDecl::signal(name);
        for (param_name, native_type) in params {
            decl = decl.param(*param_name, *native_type);
        }
        self.member(decl)
    }
}
