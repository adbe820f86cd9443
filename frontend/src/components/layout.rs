//! Console shell: sidebar navigation, header and the page body.

use leptos::prelude::*;

use crate::auth::use_auth;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
fn Sidebar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let current = router.current_route();

    view! {
        <aside class="w-64 min-h-screen bg-base-100 shadow-xl flex flex-col">
            <div class="p-6 text-2xl font-bold text-primary">"ShopDesk"</div>
            <ul class="menu flex-1 gap-1 px-4">
                {AppRoute::navigation()
                    .into_iter()
                    .map(|route| {
                        let class = Signal::derive(move || {
                            if current.get() == route { "active".to_string() } else { String::new() }
                        });
                        view! {
                            <li>
                                <Link to=route class=class>
                                    {route.title()}
                                </Link>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
            <div class="p-4">
                <button class="btn btn-outline btn-error w-full" on:click=move |_| auth.logout()>
                    "Logout"
                </button>
            </div>
        </aside>
    }
}

#[component]
fn Header() -> impl IntoView {
    let user = use_auth().user();
    let greeting = move || match user.get() {
        Some(u) => format!("Welcome, {}", u.email),
        None => "Welcome".to_string(),
    };

    view! {
        <header class="navbar bg-base-100 rounded-box shadow px-6">
            <div class="flex-1 text-lg font-semibold">{greeting}</div>
        </header>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="flex min-h-screen bg-base-200 font-sans">
            <Sidebar />
            <main class="flex-1 p-4 md:p-8 space-y-6">
                <Header />
                {children()}
            </main>
        </div>
    }
}

/// Body of `/`.
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Admin console"</h2>
                <p class="text-base-content/70">
                    "Pick a section from the sidebar to review sales, orders and the catalog."
                </p>
            </div>
        </div>
    }
}
