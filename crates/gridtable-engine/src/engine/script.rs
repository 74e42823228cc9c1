//! Rhai engine setup for script-defined custom filters.
//!
//! A filter script is a Rhai expression evaluated once per row with three
//! variables in scope: `value` (the column value), `target` (the filter's
//! value) and `operator` (the filter's operator name). It must yield a bool.

use rhai::{AST, Dynamic, Engine, EvalAltResult, Scope};
use std::fmt;
use std::sync::Arc;

use super::value::Value;

/// Create the Rhai engine used for filter scripts.
pub fn create_filter_engine() -> Engine {
    let mut engine = Engine::new();
    // Scripts run once per row; keep a runaway script from stalling the pipeline.
    engine.set_max_operations(50_000);
    engine.set_max_expr_depths(64, 32);
    engine
}

/// Convert a cell value into a Rhai value. Null and undefined become `()`.
pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null | Value::Undefined => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Number(n) => Dynamic::from_float(*n),
        Value::Text(s) => Dynamic::from(s.clone()),
        Value::Date(_) => Dynamic::from(value.display()),
        Value::List(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
    }
}

/// A compiled filter script bound to the engine that compiled it.
#[derive(Clone)]
pub struct FilterScript {
    source: String,
    ast: Arc<AST>,
    engine: Arc<Engine>,
}

impl FilterScript {
    /// Compile `source`. Returns the parse error message on failure.
    pub fn compile(engine: Arc<Engine>, source: &str) -> Result<FilterScript, String> {
        let ast = engine
            .compile(source)
            .map_err(|e| format!("Error in filter script: {}", e))?;
        Ok(FilterScript {
            source: source.to_string(),
            ast: Arc::new(ast),
            engine,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn eval(
        &self,
        value: &Value,
        target: &Value,
        operator: &str,
    ) -> Result<bool, Box<EvalAltResult>> {
        let mut scope = Scope::new();
        scope.push_dynamic("value", to_dynamic(value));
        scope.push_dynamic("target", to_dynamic(target));
        scope.push("operator", operator.to_string());
        self.engine.eval_ast_with_scope::<bool>(&mut scope, &self.ast)
    }
}

impl fmt::Debug for FilterScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterScript")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> FilterScript {
        FilterScript::compile(Arc::new(create_filter_engine()), source).unwrap()
    }

    #[test]
    fn test_script_sees_value_and_target() {
        let script = compile("value >= target");
        assert!(script.eval(&Value::from(30), &Value::from(18), "custom").unwrap());
        assert!(!script.eval(&Value::from(12), &Value::from(18), "custom").unwrap());
    }

    #[test]
    fn test_script_string_methods() {
        let script = compile(r#"value.to_lower().contains("ohn")"#);
        assert!(script.eval(&Value::from("JOHN"), &Value::Null, "").unwrap());
    }

    #[test]
    fn test_script_null_is_unit() {
        let script = compile("value == ()");
        assert!(script.eval(&Value::Undefined, &Value::Null, "").unwrap());
    }

    #[test]
    fn test_non_bool_result_is_error() {
        let script = compile("value + 1");
        assert!(script.eval(&Value::from(1), &Value::Null, "").is_err());
    }

    #[test]
    fn test_compile_error_is_reported() {
        let result = FilterScript::compile(Arc::new(create_filter_engine()), "value >=");
        assert!(result.is_err());
    }
}
