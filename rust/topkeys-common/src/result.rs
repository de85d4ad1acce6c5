pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_format(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn invalid_format(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidFormat {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::ErrorKind;

    fn check_window(probe: u64, nominal: u64) -> crate::Result<()> {
        verify_arg!(probe_block_size, probe > 0);
        verify_arg!(nominal_segment_size, nominal >= 4 * probe);
        Ok(())
    }

    fn check_record(len: usize) -> crate::Result<()> {
        verify_data!(record, len <= 8);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_window(16, 64).is_ok());

        let err = check_window(16, 63).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "nominal_segment_size");
                assert_eq!(message, "nominal >= 4 * probe");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }

        assert!(matches!(
            check_window(0, 64).unwrap_err().into_kind(),
            ErrorKind::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_verify_data() {
        assert!(check_record(8).is_ok());
        let err = check_record(9).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { element, .. } if element == "record"));
    }
}
