//! Success/failure plumbing shared by every layer.
//!
//! `std::result::Result` is the container: a true sum type where exactly one of `Ok` or `Err`
//! holds a value, with `map`, `map_err`, `and_then`, `or_else`, `and`, `or`, `unwrap_or` and
//! friends already provided. This module adds the pieces the proxy leans on on top of it:
//!
//! - [`ResultExt::fold`] collapses both branches into a single value, which is how the HTTP
//!   adapter turns an outcome into a response without early returns.
//! - [`catch_panic`] and [`catch_panic_async`] turn code that may unwind into a `Result`, running
//!   the panic payload through a caller-supplied mapping function.

use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Payload carried by an unwinding panic.
pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// Extra combinators for [`Result`].
pub trait ResultExt<T, E> {
    /// Handle both variants exhaustively, returning whatever the firing branch produces.
    fn fold<U, F, G>(self, on_ok: F, on_err: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    #[inline]
    fn fold<U, F, G>(self, on_ok: F, on_err: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }
}

/// Run `f`, converting a panic into `Err(map_err(payload))`.
pub fn catch_panic<T, E, F, M>(f: F, map_err: M) -> Result<T, E>
where
    F: FnOnce() -> T,
    M: FnOnce(PanicPayload) -> E,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(map_err)
}

/// Await `future`, converting a panic raised while polling into `Err(map_err(payload))`.
pub async fn catch_panic_async<T, E, Fut, M>(future: Fut, map_err: M) -> Result<T, E>
where
    Fut: Future<Output = T>,
    M: FnOnce(PanicPayload) -> E,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(map_err)
}

/// Best-effort readable message for a panic payload.
pub fn panic_message(payload: &PanicPayload) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_fires_only_the_matching_branch() {
        let ok: Result<u32, String> = Ok(2);
        let err: Result<u32, String> = Err("boom".into());

        assert_eq!(ok.fold(|v| format!("ok:{v}"), |e| format!("err:{e}")), "ok:2");
        assert_eq!(err.fold(|v| format!("ok:{v}"), |e| format!("err:{e}")), "err:boom");
    }

    #[test]
    fn combinators_leave_the_other_side_untouched() {
        let ok: Result<u32, String> = Ok(3);
        assert_eq!(ok.clone().map_err(|e| e.len()), Ok(3));
        assert_eq!(ok.clone().map(|v| v * 2), Ok(6));
        assert_eq!(ok.and_then(|v| Err::<u32, _>(format!("stop at {v}"))), Err("stop at 3".into()));

        let err: Result<u32, String> = Err("bad".into());
        assert_eq!(err.clone().map(|v| v * 2), Err("bad".into()));
        assert_eq!(err.clone().unwrap_or(7), 7);
        assert_eq!(err.clone().unwrap_or_else(|e| e.len() as u32), 3);
        assert_eq!(err.or_else(|_| Ok::<u32, ()>(1)), Ok(1));
    }

    #[test]
    fn and_or_short_circuit() {
        let ok: Result<u32, &str> = Ok(1);
        let err: Result<u32, &str> = Err("first");

        assert_eq!(ok.and(Ok::<&str, &str>("next")), Ok("next"));
        assert_eq!(err.and(Ok::<&str, &str>("next")), Err("first"));
        assert_eq!(ok.or(Err::<u32, &str>("other")), Ok(1));
        assert_eq!(err.or(Ok::<u32, &str>(9)), Ok(9));
    }

    #[test]
    #[should_panic]
    fn unwrap_err_on_ok_panics() {
        let ok: Result<u32, String> = Ok(1);
        let _ = ok.unwrap_err();
    }

    #[test]
    fn catch_panic_maps_payload() {
        let outcome: Result<u32, String> =
            catch_panic(|| -> u32 { panic!("exploded") }, |payload| panic_message(&payload));
        assert_eq!(outcome, Err("exploded".to_string()));

        let fine: Result<u32, String> = catch_panic(|| 5, |payload| panic_message(&payload));
        assert_eq!(fine, Ok(5));
    }

    #[tokio::test]
    async fn catch_panic_async_maps_payload() {
        let outcome: Result<u32, String> = catch_panic_async(
            async {
                let code: u32 = 42;
                if code == 42 {
                    panic!("async failure {code}");
                }
                code
            },
            |payload| panic_message(&payload),
        )
        .await;
        assert_eq!(outcome, Err("async failure 42".to_string()));

        let fine: Result<u32, String> =
            catch_panic_async(async { 8 }, |payload| panic_message(&payload)).await;
        assert_eq!(fine, Ok(8));
    }
}
