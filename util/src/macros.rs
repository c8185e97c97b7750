/// Print to stderr before tracing is up.
#[macro_export]
macro_rules! bootstrap {
    ($x:expr $( , $xs:expr )* $(,)?) => {
        eprintln!(concat!("[{} bootstrap] ", $x), $crate::build::PACKAGE $( , $xs )*)
    };
}

/// Log the error of a `Result` at error level and hand the `Result` back.
#[macro_export]
macro_rules! trace_catch {
    ($val:expr, $($rest:tt)+) => {
        match $val {
            Err(e) => {
                $crate::tracing::error!(error = %e, $($rest)+);
                Err(e)
            },
            ok => ok,
        }
    };
}

#[cfg(test)]
mod test {
    #[test]
    fn trace_catch_passes_result_through() {
        let failed: Result<u8, String> = Err("no port".to_owned());
        assert_eq!(crate::trace_catch!(failed.clone(), "open failed"), failed);

        let opened: Result<u8, String> = Ok(3);
        assert_eq!(crate::trace_catch!(opened, port = 3, "open failed"), Ok(3));
    }
}
