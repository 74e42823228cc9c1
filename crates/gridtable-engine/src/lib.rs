//! gridtable_engine - Row pipeline algorithms for the gridtable data grid.
//!
//! Everything in here is a pure function of its inputs: no instance state,
//! no events, no I/O. The stateful container lives in `gridtable-core`.

pub mod engine;

#[doc(hidden)]
#[macro_export]
macro_rules! record {
    () => {
        $crate::engine::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::engine::Record::new();
        $(
            record.insert(::std::string::String::from($key), $crate::engine::Value::from($value));
        )+
        record
    }};
}
