use leptos::context::Provider;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

use crate::components::hooks::use_random::use_random_id_for;

mod components {
    use super::*;
    clx! {PopoverTitle, h3, "leading-none font-medium", "mb-3"}
}

#[allow(unused_imports)]
pub use components::*;

/* ========================================================== */
/*                     ✨ FUNCTIONS ✨                        */
/* ========================================================== */

/// Popover whose visibility is owned by the caller.
///
/// The trigger and the backdrop only *request* a change through
/// `on_open_change`; nothing opens or closes until `open` says so.
#[derive(Clone)]
struct PopoverContext {
    target_id: String,
    open: Signal<bool>,
    on_open_change: Callback<bool>,
}

#[component]
pub fn Popover(
    children: Children,
    #[prop(into)] open: Signal<bool>,
    on_open_change: Callback<bool>,
    #[prop(optional, into)] class: String,
) -> impl IntoView {
    let ctx = PopoverContext {
        target_id: use_random_id_for("popover"),
        open,
        on_open_change,
    };

    let merged_class = tw_merge!("relative", class);

    view! {
        <Provider value=ctx>
            <div class=merged_class data-name="Popover">
                {children()}
            </div>
        </Provider>
    }
}

#[component]
pub fn PopoverTrigger(children: Children, #[prop(optional, into)] class: String) -> impl IntoView {
    let ctx = expect_context::<PopoverContext>();
    let button_class = tw_merge!(
        "px-4 py-2 h-9 inline-flex justify-center items-center text-sm font-medium whitespace-nowrap rounded-md transition-colors w-fit focus-visible:outline-hidden focus-visible:ring-1 focus-visible:ring-ring disabled:cursor-not-allowed disabled:opacity-50 border bg-background border-input hover:bg-accent hover:text-accent-foreground",
        class
    );

    let open = ctx.open;
    let on_open_change = ctx.on_open_change;

    view! {
        <button
            class=button_class
            aria-haspopup="dialog"
            aria-controls=ctx.target_id
            aria-expanded=move || open.get().to_string()
            tabindex="0"
            type="button"
            on:click=move |_| on_open_change.run(!open.get_untracked())
        >
            {children()}
        </button>
    }
}

/// Modal content: a click on the backdrop asks to close.
#[component]
pub fn PopoverContent(children: ChildrenFn, #[prop(optional, into)] class: String) -> impl IntoView {
    let ctx = expect_context::<PopoverContext>();
    let class = StoredValue::new(tw_merge!(
        "fixed top-1/2 left-1/2 -translate-x-1/2 -translate-y-1/2 z-100 p-4 rounded-md border bg-card shadow-2xl shadow-black/80 w-[min(24rem,calc(100%-2rem))]",
        class
    ));
    let target_id = StoredValue::new(ctx.target_id.clone());
    let open = ctx.open;
    let on_open_change = ctx.on_open_change;
    let children = StoredValue::new(children);

    view! {
        <Show when=move || open.get()>
            <div
                data-name="PopoverBackdrop"
                class="fixed inset-0 z-60 bg-black/30 backdrop-blur-sm"
                on:click=move |_| on_open_change.run(false)
            />
            <div
                data-name="PopoverContent"
                role="dialog"
                aria-modal="true"
                class=class.get_value()
                id=target_id.get_value()
            >
                {children.with_value(|children| children())}
            </div>
        </Show>
    }
}
