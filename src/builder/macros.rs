//! Macros for ergonomic machine construction.

/// Build an [`Assignment`](crate::effects::Assignment) from `field => fn` pairs.
///
/// Every function receives the context as it was before the assignment
/// and the triggering event.
///
/// # Example
///
/// ```
/// use chartwell::assign;
/// use chartwell::core::{Context, Event, Value};
///
/// let clear = assign! {
///     "filter" => |_, _| "",
///     "value" => |_, _| Value::Null,
///     "echo" => |ctx: &Context, _: &Event| ctx.get_text("filter").unwrap_or_default().to_string(),
/// };
///
/// let ctx = Context::new().with("filter", "ap").with("value", "x").with("echo", "");
/// let next = clear.apply(&ctx, &Event::new("CLEAR"));
///
/// assert_eq!(next.get_text("filter"), Some(""));
/// assert!(next.get("value").unwrap().is_null());
/// assert_eq!(next.get_text("echo"), Some("ap"));
/// ```
#[macro_export]
macro_rules! assign {
    ($($field:expr => $compute:expr),* $(,)?) => {
        $crate::effects::Assignment::new()$(.field($field, $compute))*
    };
}
