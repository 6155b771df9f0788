cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! trace {
            ($($tt:tt)*) => { tracing::trace!($($tt)*) };
        }
        macro_rules! debug {
            ($($tt:tt)*) => { tracing::debug!($($tt)*) };
        }
    } else {
        macro_rules! trace {
            ($($tt:tt)*) => {};
        }
        macro_rules! debug {
            ($($tt:tt)*) => {};
        }
    }
}
pub(crate) use debug;
pub(crate) use trace;
