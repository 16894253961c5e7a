//! Binding Generator
//!
//! Pure string emitters for the generated artifacts. Given the same schema,
//! every emitter produces byte-identical output.

use bridge_types::schema::{CapabilityDescriptor, Schema};

// ─────────────────────────────────────────────────────────────────────────────
// Naming helpers
// ─────────────────────────────────────────────────────────────────────────────

/// PascalCase an exported name for interface/class names.
pub fn to_pascal_case(name: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            capitalize_next = true;
            continue;
        }
        if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "HostApi".to_string()
    } else {
        result
    }
}

fn promise_return(returns_void: bool, ts_return: &str) -> String {
    if returns_void {
        "Promise<void>".to_string()
    } else {
        format!("Promise<{}>", ts_return)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type-definition file
// ─────────────────────────────────────────────────────────────────────────────

/// Emit the `hostapi.d.ts` type-definition file: the generic schema shape,
/// one interface per capability, and the root bridge interface.
pub fn generate_type_definitions(schema: &Schema) -> String {
    let mut text = String::new();
    text.push_str("// Generated HostApi types. Do not edit.\n\n");

    text.push_str("export interface HostApiSchemaParam {\n");
    text.push_str("  name: string;\n");
    text.push_str("  type: string;\n");
    text.push_str("  tsType: string;\n");
    text.push_str("}\n\n");

    text.push_str("export interface HostApiSchemaMethod {\n");
    text.push_str("  name: string;\n");
    text.push_str("  returnType: string;\n");
    text.push_str("  tsReturn: string;\n");
    text.push_str("  returnsVoid: boolean;\n");
    text.push_str("  params: HostApiSchemaParam[];\n");
    text.push_str("}\n\n");

    text.push_str("export interface HostApiSchemaSignal {\n");
    text.push_str("  name: string;\n");
    text.push_str("  params: HostApiSchemaParam[];\n");
    text.push_str("}\n\n");

    text.push_str("export interface HostApiSchemaObject {\n");
    text.push_str("  name: string;\n");
    text.push_str("  nativeName: string;\n");
    text.push_str("  methods: HostApiSchemaMethod[];\n");
    text.push_str("  signals: HostApiSchemaSignal[];\n");
    text.push_str("}\n\n");

    text.push_str("export interface HostApiSchema {\n");
    text.push_str("  version: string;\n");
    text.push_str("  eventTypes: string[];\n");
    text.push_str("  objects: HostApiSchemaObject[];\n");
    text.push_str("}\n\n");

    for object in &schema.objects {
        let iface = format!("{}Api", to_pascal_case(&object.name));
        text.push_str(&format!("export interface {} {{\n", iface));
        for method in &object.methods {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ts_type))
                .collect();
            text.push_str(&format!(
                "  {}({}): {};\n",
                method.name,
                params.join(", "),
                promise_return(method.returns_void, &method.ts_return)
            ));
        }
        if object.signals.is_empty() {
            text.push_str(
                "  registerEventHandler(eventName: string, handler: (...args: any[]) => void): void;\n",
            );
            text.push_str(
                "  removeEventHandler(eventName: string, handler: (...args: any[]) => void): void;\n",
            );
        } else {
            for signal in &object.signals {
                let params: Vec<String> = signal
                    .params
                    .iter()
                    .map(|p| format!("{}: {}", p.name, p.ts_type))
                    .collect();
                let handler = format!("({}) => void", params.join(", "));
                text.push_str(&format!(
                    "  registerEventHandler(eventName: \"{}\", handler: {}): void;\n",
                    signal.name, handler
                ));
                text.push_str(&format!(
                    "  removeEventHandler(eventName: \"{}\", handler: {}): void;\n",
                    signal.name, handler
                ));
            }
        }
        text.push_str("  __raw?: any;\n");
        text.push_str("}\n\n");
    }

    text.push_str("export interface HostApiRoot {\n");
    text.push_str("  version: string;\n");
    text.push_str("  schema: HostApiSchema;\n");
    text.push_str("  validEventTypes: string[];\n");
    text.push_str("  sendData(payload: any): void;\n");
    text.push_str("  setOutput(text: string): void;\n");
    text.push_str("  getInput(): Promise<string>;\n");
    text.push_str("  addEventListener(eventName: string, handler: (payload: any) => void): void;\n");
    text.push_str("  removeEventListener(eventName: string, handler: (payload: any) => void): void;\n");
    for object in &schema.objects {
        text.push_str(&format!(
            "  {}: {}Api;\n",
            object.name,
            to_pascal_case(&object.name)
        ));
    }
    text.push_str("}\n\n");

    text.push_str("declare global {\n");
    text.push_str("  interface Window {\n");
    text.push_str("    HostApi: HostApiRoot;\n");
    text.push_str("    HostApiExpectedVersion?: string;\n");
    text.push_str("  }\n");
    text.push_str("}\n");
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Angular service wrappers
// ─────────────────────────────────────────────────────────────────────────────

/// Emit one injectable service wrapper delegating 1:1 to the capability's
/// proxy on the root bridge object.
pub fn generate_service_wrapper(object: &CapabilityDescriptor) -> String {
    let class_name = format!("{}Service", to_pascal_case(&object.name));
    let mut text = String::new();
    text.push_str("import { Injectable } from \"@angular/core\";\n\n");
    text.push_str("@Injectable({ providedIn: \"root\" })\n");
    text.push_str(&format!("export class {} {{\n", class_name));
    text.push_str("  private get api() {\n");
    text.push_str(&format!(
        "    if (!window || !window.HostApi || !window.HostApi.{}) {{\n",
        object.name
    ));
    text.push_str("      throw new Error(\"HostApi is not ready.\");\n");
    text.push_str("    }\n");
    text.push_str(&format!("    return window.HostApi.{};\n", object.name));
    text.push_str("  }\n\n");

    for method in &object.methods {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ts_type))
            .collect();
        let names: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        text.push_str(&format!(
            "  {}({}): {} {{\n",
            method.name,
            params.join(", "),
            promise_return(method.returns_void, &method.ts_return)
        ));
        text.push_str(&format!(
            "    return this.api.{}({});\n",
            method.name,
            names.join(", ")
        ));
        text.push_str("  }\n\n");
    }

    if object.signals.is_empty() {
        text.push_str(
            "  registerEventHandler(eventName: string, handler: (...args: any[]) => void): void {\n",
        );
        text.push_str("    this.api.registerEventHandler(eventName, handler);\n");
        text.push_str("  }\n\n");
        text.push_str(
            "  removeEventHandler(eventName: string, handler: (...args: any[]) => void): void {\n",
        );
        text.push_str("    this.api.removeEventHandler(eventName, handler);\n");
        text.push_str("  }\n");
    } else {
        for signal in &object.signals {
            let params: Vec<String> = signal
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ts_type))
                .collect();
            let handler = format!("({}) => void", params.join(", "));
            text.push_str(&format!(
                "  registerEventHandler(eventName: \"{}\", handler: {}): void {{\n",
                signal.name, handler
            ));
            text.push_str("    this.api.registerEventHandler(eventName, handler);\n");
            text.push_str("  }\n\n");
            text.push_str(&format!(
                "  removeEventHandler(eventName: \"{}\", handler: {}): void {{\n",
                signal.name, handler
            ));
            text.push_str("    this.api.removeEventHandler(eventName, handler);\n");
            text.push_str("  }\n\n");
        }
        if text.ends_with("\n\n") {
            text.pop();
        }
    }

    text.push_str("}\n");
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Package descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Emit the distributable `package.json` descriptor.
pub fn generate_package_json(package_name: &str, version: &str) -> String {
    let root = serde_json::json!({
        "name": package_name,
        "version": version,
        "description": "Generated HostApi types and Angular services.",
        "types": "hostapi.d.ts",
        "files": ["hostapi.d.ts", "angular/"],
        "exports": {
            ".": "./hostapi.d.ts",
            "./angular/*": "./angular/*",
        },
    });
    let mut text = serde_json::to_string_pretty(&root).unwrap_or_else(|_| "{}".to_string());
    text.push('\n');
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Rust registration glue
// ─────────────────────────────────────────────────────────────────────────────

/// Emit the generated Rust registration module: the embedded schema constant,
/// an init-once cached accessor, and the capability registration function.
pub fn generate_host_glue(schema: &Schema) -> String {
    let schema_json = schema.to_json_text();
    let mut text = String::new();
    text.push_str("// Generated host registration glue. Do not edit.\n\n");
    text.push_str("use std::sync::OnceLock;\n\n");
    text.push_str("use bridge_runtime::host::BridgeHost;\n");
    text.push_str("use bridge_types::Schema;\n\n");
    text.push_str("/// Embedded schema JSON, produced at build time.\n");
    text.push_str(&format!(
        "pub const HOST_API_SCHEMA_JSON: &str = r##\"{}\"##;\n\n",
        schema_json
    ));
    text.push_str("/// Parse the embedded schema once per process and cache it.\n");
    text.push_str("///\n");
    text.push_str("/// Init-once semantics: the first call parses, later calls return the\n");
    text.push_str("/// cached document. The cache is read-only, so no reset hook is needed.\n");
    text.push_str("pub fn host_api_schema() -> &'static Schema {\n");
    text.push_str("    static SCHEMA: OnceLock<Schema> = OnceLock::new();\n");
    text.push_str("    SCHEMA.get_or_init(|| {\n");
    text.push_str("        Schema::from_json_text(HOST_API_SCHEMA_JSON).unwrap_or_default()\n");
    text.push_str("    })\n");
    text.push_str("}\n\n");
    text.push_str("/// Instantiate every generated capability and bind it on the host.\n");
    text.push_str("pub fn register_host_api_capabilities(host: &mut BridgeHost) {\n");
    for object in &schema.objects {
        text.push_str(&format!(
            "    host.register_capability(\"{}\", Box::new(crate::{}::default()));\n",
            object.name, object.native_name
        ));
    }
    text.push_str("}\n");
    text
}
