//! Optional logging
//!
//! Thin wrappers over the `log` facade. Without the `log` feature every macro
//! expands to a unit expression that still type-checks its arguments, so it
//! is usable in any expression position and leaves no unused bindings.

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_are_expressions() {
        let outcome: Result<u8, &str> = Err("bus idle");
        let value = match outcome {
            Ok(v) => v,
            Err(e) => {
                log_warn!("fallback after {}", e);
                0
            }
        };
        assert_eq!(value, 0);

        match outcome {
            Ok(_) => log_info!("read ok"),
            Err(e) => log_debug!("read failed: {}", e),
        }
    }
}
