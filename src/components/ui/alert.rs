use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {AlertError, div, "relative w-full rounded-lg border border-destructive/30 bg-destructive/5 px-4 py-3 text-sm flex items-start justify-between gap-2"}
    clx! {AlertDescription, p, "text-sm break-words [&_p]:leading-relaxed"}
}

#[allow(unused_imports)]
pub use components::*;
