use leptos::prelude::*;
use leptos::task::spawn_local;
use shopdesk_shared::dataset::{SortDirection, SortState, paginate};
use shopdesk_shared::protocol::{DeleteOrderRequest, ListOrdersRequest, UpdateOrderStatusRequest};
use shopdesk_shared::{OrderStatus, Record};

use crate::analytics::format_currency;
use crate::auth::use_auth;
use crate::components::notification::{Notice, Toast};
use crate::components::table::{Pager, SortHeader};
use crate::fetch::{LatestOnly, begin_owned};
use crate::web::confirm;

const PAGE_SIZE: usize = 10;

fn order_id(order: &Record) -> String {
    order.text_field("id").unwrap_or_default()
}

fn status_badge(status: Option<OrderStatus>) -> &'static str {
    match status {
        Some(OrderStatus::Pending) => "badge badge-warning",
        Some(OrderStatus::Processing) => "badge badge-info",
        Some(OrderStatus::Shipped) => "badge badge-success",
        Some(OrderStatus::Delivered) => "badge badge-secondary",
        Some(OrderStatus::Cancelled) => "badge badge-error",
        None => "badge badge-ghost",
    }
}

#[component]
pub fn OrdersPage() -> impl IntoView {
    let auth = use_auth();

    let orders = RwSignal::new(Vec::<Record>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Option::<Notice>::None);
    let sort = RwSignal::new(SortState::new("id", SortDirection::Descending));
    let page = RwSignal::new(1usize);
    let latest = StoredValue::new(LatestOnly::new());

    let fetch_orders = move || {
        let Some((seq, ticket)) = begin_owned(latest) else {
            return;
        };
        let api = auth.api();
        loading.set(true);
        error.set(None);

        spawn_local(async move {
            let result = api.call(&ListOrdersRequest).await;
            seq.apply(ticket, result, |result| {
                match result {
                    Ok(list) => orders.set(list),
                    Err(err) => {
                        let reason = auth.handle_error("Orders", &err);
                        error.set(Some(format!("Failed to fetch orders: {}", reason)));
                    }
                }
                loading.set(false);
            });
        });
    };

    let update_status = move |id: String, status: OrderStatus| {
        let api = auth.api();
        spawn_local(async move {
            match api.call(&UpdateOrderStatusRequest { id: id.clone(), status }).await {
                Ok(updated) => {
                    orders.update(|list| {
                        if let Some(slot) = list.iter_mut().find(|o| order_id(o) == id) {
                            *slot = updated;
                        }
                    });
                    notice.set(Some(Notice::success(format!("Order #{} is now {}", id, status.as_str()))));
                }
                Err(err) => {
                    auth.handle_error("Order status", &err);
                    notice.set(Some(Notice::error("Failed to update order status")));
                }
            }
        });
    };

    let delete_order = move |id: String| {
        if !confirm("Are you sure you want to delete this order?") {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.call(&DeleteOrderRequest { id: id.clone() }).await {
                Ok(()) => {
                    orders.update(|list| list.retain(|o| order_id(o) != id));
                    notice.set(Some(Notice::success(format!("Order #{} deleted", id))));
                }
                Err(err) => {
                    auth.handle_error("Order delete", &err);
                    notice.set(Some(Notice::error(format!("Failed to delete order #{}", id))));
                }
            }
        });
    };

    Effect::new(move |_| fetch_orders());

    let sorted = Memo::new(move |_| orders.with(|list| sort.with(|s| s.apply(list))));
    let current_page = Signal::derive(move || sorted.with(|rows| paginate(rows, page.get(), PAGE_SIZE)));

    view! {
        <div class="space-y-4">
            <Toast notice=notice />

            <div class="flex flex-wrap items-center justify-between gap-2">
                <div>
                    <h1 class="text-2xl font-bold">"Orders Dashboard"</h1>
                    <p class="text-base-content/70 text-sm">"Review orders and move them through fulfilment."</p>
                </div>
                <button class="btn btn-primary btn-sm" on:click=move |_| fetch_orders() disabled=move || loading.get()>
                    "Refresh"
                </button>
            </div>

            {move || error.get().map(|msg| view! {
                <div role="alert" class="alert alert-error text-sm">
                    <span>{msg}</span>
                </div>
            })}

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <SortHeader label="Order ID" column="id" sort=sort />
                                <SortHeader label="Customer" column="user_email" sort=sort />
                                <SortHeader label="Total" column="total_price" sort=sort />
                                <SortHeader label="Status" column="status" sort=sort />
                                <th>"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || loading.get() && orders.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="5" class="text-center py-8">
                                        <span class="loading loading-spinner loading-md"></span>
                                    </td>
                                </tr>
                            </Show>
                            <Show when=move || !loading.get() && orders.with(Vec::is_empty)>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        "No orders available"
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || current_page.get().items
                                key=|order| order.to_string()
                                children=move |order| {
                                    let id = order_id(&order);
                                    let status = order.text_field("status").as_deref().and_then(OrderStatus::parse);
                                    let deletable = status == Some(OrderStatus::Pending);
                                    let id_for_status = id.clone();
                                    let id_for_delete = id.clone();
                                    view! {
                                        <tr>
                                            <td class="font-mono">"#" {id.clone()}</td>
                                            <td>{order.text_field("user_email").unwrap_or_default()}</td>
                                            <td class="font-mono">
                                                {format_currency(order.numeric_field("total_price").unwrap_or(0.0))}
                                            </td>
                                            <td>
                                                <span class=status_badge(status)>
                                                    {order.text_field("status").unwrap_or_default()}
                                                </span>
                                            </td>
                                            <td class="flex gap-2">
                                                <select
                                                    class="select select-bordered select-sm"
                                                    on:change=move |ev| {
                                                        if let Some(next) = OrderStatus::parse(&event_target_value(&ev)) {
                                                            update_status(id_for_status.clone(), next);
                                                        }
                                                    }
                                                >
                                                    <option value="" selected>"Update status"</option>
                                                    {OrderStatus::ALL
                                                        .into_iter()
                                                        .map(|s| view! { <option value=s.as_str()>{s.as_str()}</option> })
                                                        .collect_view()}
                                                </select>
                                                <button
                                                    class="btn btn-error btn-outline btn-sm"
                                                    disabled=!deletable
                                                    title=if deletable { "Delete order" } else { "Only pending orders can be deleted" }
                                                    on:click=move |_| delete_order(id_for_delete.clone())
                                                >
                                                    "Delete"
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
                <Pager page=current_page current=page />
            </div>
        </div>
    }
}
