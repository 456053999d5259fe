// Logging macros

/// Build a `Vec<Field>` from `key => value` pairs.
///
/// ```
/// use sugar_logger::fields;
///
/// let fields = fields!["ward" => "B", "bed" => 4];
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![$($crate::Field::new($key, $value)),*]
    };
}

/// Format-string logging through the global logger.
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::debugf(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::infof(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::warnf(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::errorf(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::fatalf(format_args!($($arg)+))
    };
}
