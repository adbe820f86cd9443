//! Catalog management: filtered product grid, create/edit form, categories.

use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use shopdesk_shared::protocol::{
    CreateCategoryRequest, CreateProductRequest, DeleteProductRequest, ListCategoriesRequest,
    ListProductsRequest, PRODUCT_IMAGE_FIELD, UpdateProductRequest,
};
use shopdesk_shared::{ProductFilters, Record};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

use crate::api::{ApiError, Upload};
use crate::auth::use_auth;
use crate::components::notification::{Notice, Toast};
use crate::fetch::{LatestOnly, begin_owned};
use crate::forms::{apply_choice, apply_input, input_text};
use crate::web::confirm;

const TEXT_FIELDS: &[&str] = &["name", "description", "primary_material", "condition"];

const MATERIALS: &[(&str, &str)] = &[
    ("WOOD", "Wood"),
    ("METAL", "Metal"),
    ("FABRIC", "Fabric"),
    ("LEATHER", "Leather"),
    ("GLASS", "Glass"),
    ("PLASTIC", "Plastic"),
];

const CONDITIONS: &[(&str, &str)] = &[("NEW", "New"), ("USED", "Used"), ("REFURBISHED", "Refurbished")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Create,
    Edit,
}

fn blank_product() -> Record {
    Record::new()
        .with("name", "")
        .with("description", "")
        .with("price", "")
        .with("category", Value::Null)
        .with("primary_material", "")
        .with("condition", "NEW")
        .with("is_available", true)
        .with("stock", 1)
}

fn product_id(product: &Record) -> String {
    product.text_field("id").unwrap_or_default()
}

/// URL of the stored product image, if the server has one.
fn image_url(product: &Record) -> Option<String> {
    product
        .text_field(PRODUCT_IMAGE_FIELD)
        .filter(|url| !url.trim().is_empty())
}

/// Catalog query for the current filters; `None` once the page is gone.
fn list_request(filters: RwSignal<ProductFilters>) -> Option<ListProductsRequest> {
    filters
        .try_get_untracked()
        .map(|filters| ListProductsRequest { filters })
}

fn category_name(categories: &[Record], product: &Record) -> Option<String> {
    let wanted = product.get("category")?;
    if wanted.is_null() {
        return None;
    }
    Some(
        categories
            .iter()
            .find(|c| c.get("id") == Some(wanted))
            .and_then(|c| c.text_field("name"))
            .unwrap_or_else(|| "Unknown Category".to_string()),
    )
}

#[component]
fn ProductForm(
    mode: RwSignal<Mode>,
    product: RwSignal<Record>,
    categories: RwSignal<Vec<Record>>,
    image: RwSignal<Option<Upload>, LocalStorage>,
    submitting: ReadSignal<bool>,
    on_submit: impl Fn() + Copy + Send + Sync + 'static,
) -> impl IntoView {
    let text = move |label: &'static str, name: &'static str, kind: &'static str| {
        view! {
            <label class="form-control">
                <span class="label-text">{label}</span>
                <input
                    type=kind
                    name=name
                    step="any"
                    class="input input-bordered"
                    prop:value=move || product.with(|p| input_text(p, name))
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        product.update(|p| apply_input(p, name, &raw, TEXT_FIELDS));
                    }
                    required
                />
            </label>
        }
    };

    let choice = move |label: &'static str, name: &'static str, options: &'static [(&'static str, &'static str)]| {
        view! {
            <label class="form-control">
                <span class="label-text">{label}</span>
                <select
                    name=name
                    class="select select-bordered"
                    prop:value=move || product.with(|p| input_text(p, name))
                    on:change=move |ev| {
                        let raw = event_target_value(&ev);
                        product.update(|p| p.set(name, raw));
                    }
                >
                    <option value="">{format!("Select a {}", label.to_lowercase())}</option>
                    {options
                        .iter()
                        .map(|(value, text)| view! { <option value=*value>{*text}</option> })
                        .collect_view()}
                </select>
            </label>
        }
    };

    let title = move || if mode.get() == Mode::Create { "Create New Product" } else { "Edit Product" };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form
                class="card-body"
                on:submit=move |ev| {
                    ev.prevent_default();
                    on_submit();
                }
            >
                <h2 class="card-title">{title}</h2>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {text("Name", "name", "text")}
                    {text("Price", "price", "number")}
                    <label class="form-control md:col-span-2">
                        <span class="label-text">"Description"</span>
                        <textarea
                            name="description"
                            class="textarea textarea-bordered"
                            prop:value=move || product.with(|p| input_text(p, "description"))
                            on:input=move |ev| {
                                let raw = event_target_value(&ev);
                                product.update(|p| p.set("description", raw));
                            }
                        ></textarea>
                    </label>
                    <label class="form-control">
                        <span class="label-text">"Category"</span>
                        <select
                            name="category"
                            class="select select-bordered"
                            prop:value=move || product.with(|p| input_text(p, "category"))
                            on:change=move |ev| {
                                let raw = event_target_value(&ev);
                                product.update(|p| apply_choice(p, "category", &raw));
                            }
                            required
                        >
                            <option value="">"Select a category"</option>
                            {move || categories.get()
                                .into_iter()
                                .map(|c| view! {
                                    <option value=input_text(&c, "id")>{input_text(&c, "name")}</option>
                                })
                                .collect_view()}
                        </select>
                    </label>
                    {choice("Material", "primary_material", MATERIALS)}
                    {choice("Condition", "condition", CONDITIONS)}
                    {text("Stock", "stock", "number")}
                    <label class="form-control">
                        <span class="label-text">"Image"</span>
                        <input
                            type="file"
                            name="image"
                            accept="image/*"
                            class="file-input file-input-bordered"
                            on:change=move |ev| {
                                let picked = ev
                                    .target()
                                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                                    .and_then(|input| input.files())
                                    .and_then(|files| files.get(0));
                                image.set(picked);
                            }
                        />
                        {move || product.with(image_url).map(|url| view! {
                            <img src=url alt="Current image" class="mt-2 h-20 w-20 rounded object-cover" />
                        })}
                    </label>
                    <label class="label cursor-pointer justify-start gap-2">
                        <input
                            type="checkbox"
                            name="is_available"
                            class="checkbox"
                            prop:checked=move || product.with(|p| p.get("is_available").and_then(|v| v.as_bool()).unwrap_or(false))
                            on:change=move |ev| {
                                let checked = event_target_checked(&ev);
                                product.update(|p| p.set("is_available", checked));
                            }
                        />
                        <span class="label-text">"Available for sale"</span>
                    </label>
                </div>
                <div class="card-actions justify-end mt-4">
                    <button type="button" class="btn btn-ghost" on:click=move |_| mode.set(Mode::Browse)>
                        "Cancel"
                    </button>
                    <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                        {move || if submitting.get() { "Saving..." } else { "Save Product" }}
                    </button>
                </div>
            </form>
        </div>
    }
}

#[component]
pub fn ProductManagementPage() -> impl IntoView {
    let auth = use_auth();

    let products = RwSignal::new(Vec::<Record>::new());
    let categories = RwSignal::new(Vec::<Record>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Option::<Notice>::None);
    let mode = RwSignal::new(Mode::Browse);
    let current = RwSignal::new(blank_product());
    let filters = RwSignal::new(ProductFilters::default());
    let show_filters = RwSignal::new(false);
    let show_category_form = RwSignal::new(false);
    let new_category = RwSignal::new(String::new());
    let (submitting, set_submitting) = signal(false);
    let image = RwSignal::new_local(Option::<Upload>::None);
    let latest = StoredValue::new(LatestOnly::new());

    let fail = move |context: &str, err: &ApiError| {
        let reason = auth.handle_error(context, err);
        error.set(Some(format!("{} failed: {}", context, reason)));
    };

    let fetch_products = move || {
        let Some(request) = list_request(filters) else {
            return;
        };
        let Some((seq, ticket)) = begin_owned(latest) else {
            return;
        };
        let api = auth.api();
        loading.set(true);

        spawn_local(async move {
            let result = api.call(&request).await;
            seq.apply(ticket, result, |result| {
                match result {
                    Ok(page) => {
                        products.set(page.results);
                        error.set(None);
                    }
                    Err(err) => fail("Loading products", &err),
                }
                loading.set(false);
            });
        });
    };

    let fetch_categories = move || {
        let api = auth.api();
        spawn_local(async move {
            match api.call(&ListCategoriesRequest).await {
                Ok(list) => categories.set(list),
                // the grid still works without category names
                Err(err) => {
                    auth.handle_error("Loading categories", &err);
                }
            }
        });
    };

    let save_product = move || {
        let product = current.get_untracked();
        let editing = mode.get_untracked() == Mode::Edit;
        let file = image.get_untracked();
        let api = auth.api();
        set_submitting.set(true);

        spawn_local(async move {
            let result = if editing {
                let request = UpdateProductRequest {
                    id: product_id(&product),
                    product,
                };
                api.call_with_file(&request, file).await
            } else {
                api.call_with_file(&CreateProductRequest { product }, file).await
            };
            match result {
                Ok(_) => {
                    notice.set(Some(Notice::success(if editing { "Product updated" } else { "Product created" })));
                    current.set(blank_product());
                    image.set(None);
                    mode.set(Mode::Browse);
                    error.set(None);
                    fetch_products();
                }
                Err(err) => fail(if editing { "Updating product" } else { "Creating product" }, &err),
            }
            set_submitting.set(false);
        });
    };

    let delete_product = move |id: String| {
        if !confirm("Are you sure you want to delete this product? This action cannot be undone.") {
            return;
        }
        let api = auth.api();
        set_submitting.set(true);
        spawn_local(async move {
            match api.call(&DeleteProductRequest { id }).await {
                Ok(()) => {
                    notice.set(Some(Notice::success("Product deleted")));
                    fetch_products();
                }
                Err(err) => fail("Deleting product", &err),
            }
            set_submitting.set(false);
        });
    };

    let create_category = move || {
        let name = new_category.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.call(&CreateCategoryRequest { name }).await {
                Ok(_) => {
                    new_category.set(String::new());
                    show_category_form.set(false);
                    fetch_categories();
                }
                Err(err) => fail("Creating category", &err),
            }
        });
    };

    let reset_filters = move || {
        filters.set(ProductFilters::default());
        fetch_products();
    };

    Effect::new(move |_| {
        fetch_products();
        fetch_categories();
    });

    let filter_input = move |label: &'static str, kind: &'static str, get: fn(&ProductFilters) -> &String, set: fn(&mut ProductFilters, String)| {
        view! {
            <label class="form-control">
                <span class="label-text">{label}</span>
                <input
                    type=kind
                    class="input input-bordered input-sm"
                    prop:value=move || filters.with(|f| get(f).clone())
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        filters.update(|f| set(f, raw));
                    }
                />
            </label>
        }
    };

    let filter_panel = move || {
        view! {
            <div class="grid grid-cols-1 md:grid-cols-3 gap-4 p-4 bg-base-200 rounded-box">
                <label class="form-control">
                    <span class="label-text">"Category"</span>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=move || filters.with(|f| f.category.clone())
                        on:change=move |ev| {
                            let raw = event_target_value(&ev);
                            filters.update(|f| f.category = raw);
                        }
                    >
                        <option value="">"All Categories"</option>
                        {move || categories.get()
                            .into_iter()
                            .map(|c| view! { <option value=input_text(&c, "id")>{input_text(&c, "name")}</option> })
                            .collect_view()}
                    </select>
                </label>
                {filter_input("Material", "text", |f| &f.material, |f, v| f.material = v)}
                <label class="form-control">
                    <span class="label-text">"Condition"</span>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=move || filters.with(|f| f.condition.clone())
                        on:change=move |ev| {
                            let raw = event_target_value(&ev);
                            filters.update(|f| f.condition = raw);
                        }
                    >
                        <option value="">"All Conditions"</option>
                        {CONDITIONS
                            .iter()
                            .map(|(value, text)| view! { <option value=*value>{*text}</option> })
                            .collect_view()}
                    </select>
                </label>
                {filter_input("Min Price", "number", |f| &f.min_price, |f, v| f.min_price = v)}
                {filter_input("Max Price", "number", |f| &f.max_price, |f, v| f.max_price = v)}
                <label class="form-control">
                    <span class="label-text">"Availability"</span>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=move || filters.with(|f| f.available.clone())
                        on:change=move |ev| {
                            let raw = event_target_value(&ev);
                            filters.update(|f| f.available = raw);
                        }
                    >
                        <option value="">"All"</option>
                        <option value="true">"Available"</option>
                        <option value="false">"Not Available"</option>
                    </select>
                </label>
                <div class="md:col-span-3 flex justify-end gap-2">
                    <button type="button" class="btn btn-ghost btn-sm" on:click=move |_| reset_filters()>
                        "Reset"
                    </button>
                    <button type="button" class="btn btn-primary btn-sm" on:click=move |_| fetch_products()>
                        "Apply Filters"
                    </button>
                </div>
            </div>
        }
    };

    let product_grid = move || {
        view! {
            <Show
                when=move || !products.with(Vec::is_empty)
                fallback=move || view! {
                    <p class="text-center py-8 text-base-content/50">
                        {move || if loading.get() {
                            "Loading products..."
                        } else {
                            "No products found. Try adjusting your filters or create a new product."
                        }}
                    </p>
                }
            >
                <div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3">
                    <For
                        each=move || products.get()
                        key=|p| p.to_string()
                        children=move |product| {
                            let id = product_id(&product);
                            let for_edit = product.clone();
                            let for_category = product.clone();
                            let available = product.get("is_available").and_then(|v| v.as_bool()).unwrap_or(false);
                            let name = input_text(&product, "name");
                            let thumbnail = match image_url(&product) {
                                Some(url) => view! {
                                    <img src=url alt=name class="h-full w-full object-cover" />
                                }
                                    .into_any(),
                                None => view! {
                                    <span class="text-base-content/50">"No Image"</span>
                                }
                                    .into_any(),
                            };
                            view! {
                                <div class="card bg-base-100 shadow">
                                    <figure class="h-48 bg-base-200">{thumbnail}</figure>
                                    <div class="card-body">
                                        <div class="flex justify-between items-start gap-2">
                                            <h3 class="card-title text-base truncate">{input_text(&product, "name")}</h3>
                                            <span class="badge badge-primary">
                                                {format!("KES {:.2}", product.numeric_field("price").unwrap_or(0.0))}
                                            </span>
                                        </div>
                                        <p class="text-sm text-base-content/70 line-clamp-2">{input_text(&product, "description")}</p>
                                        <div class="flex flex-wrap gap-2">
                                            {move || {
                                                categories
                                                    .with(|cats| category_name(cats, &for_category))
                                                    .map(|name| view! { <span class="badge badge-info">{name}</span> })
                                            }}
                                            {product.text_field("primary_material").filter(|m| !m.is_empty()).map(|m| view! {
                                                <span class="badge badge-success">{m}</span>
                                            })}
                                            <span class="badge badge-secondary">
                                                {input_text(&product, "condition").replace('_', " ")}
                                            </span>
                                            <span class=if available { "badge badge-success badge-outline" } else { "badge badge-error badge-outline" }>
                                                {if available { "Available" } else { "Not Available" }}
                                            </span>
                                        </div>
                                        <div class="card-actions justify-end">
                                            <button
                                                class="btn btn-sm btn-ghost"
                                                on:click=move |_| {
                                                    current.set(for_edit.clone());
                                                    image.set(None);
                                                    mode.set(Mode::Edit);
                                                }
                                            >
                                                "Edit"
                                            </button>
                                            <button
                                                class="btn btn-sm btn-error btn-outline"
                                                disabled=move || submitting.get()
                                                on:click=move |_| delete_product(id.clone())
                                            >
                                                "Delete"
                                            </button>
                                        </div>
                                    </div>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        }
    };

    let category_list = move || {
        view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <div class="flex justify-between items-center">
                        <h2 class="card-title">"Categories"</h2>
                        <button class="btn btn-sm btn-primary" on:click=move |_| show_category_form.update(|v| *v = !*v)>
                            "Add Category"
                        </button>
                    </div>
                    <Show when=move || show_category_form.get()>
                        <form
                            class="flex gap-2"
                            on:submit=move |ev| {
                                ev.prevent_default();
                                create_category();
                            }
                        >
                            <input
                                type="text"
                                placeholder="Category name"
                                class="input input-bordered input-sm flex-1"
                                prop:value=new_category
                                on:input=move |ev| new_category.set(event_target_value(&ev))
                                required
                            />
                            <button type="submit" class="btn btn-sm btn-primary">"Create"</button>
                        </form>
                    </Show>
                    <ul class="divide-y divide-base-200">
                        {move || {
                            let cats = categories.get();
                            if cats.is_empty() {
                                return view! {
                                    <li class="py-3 text-center text-base-content/50">
                                        "No categories found. Create a category to get started."
                                    </li>
                                }
                                    .into_any();
                            }
                            products.with(|prods| {
                                cats.iter()
                                    .map(|c| {
                                        let count = prods.iter().filter(|p| p.get("category") == c.get("id")).count();
                                        view! {
                                            <li class="py-3 flex justify-between">
                                                <span>{input_text(c, "name")}</span>
                                                <span class="text-sm opacity-60">{format!("{} products", count)}</span>
                                            </li>
                                        }
                                    })
                                    .collect_view()
                            })
                            .into_any()
                        }}
                    </ul>
                </div>
            </div>
        }
    };

    view! {
        <div class="space-y-4">
            <Toast notice=notice />

            <div class="flex flex-wrap items-center justify-between gap-2">
                <h1 class="text-2xl font-bold">"Product Management"</h1>
                <button
                    class="btn btn-primary btn-sm"
                    on:click=move |_| {
                        current.set(blank_product());
                        image.set(None);
                        mode.set(Mode::Create);
                    }
                >
                    "Add Product"
                </button>
            </div>

            {move || error.get().map(|msg| view! {
                <div role="alert" class="alert alert-error text-sm">
                    <span>{msg}</span>
                </div>
            })}

            {move || match mode.get() {
                Mode::Browse => view! {
                    <div class="space-y-4">
                        <form
                            class="flex flex-wrap gap-2"
                            on:submit=move |ev| {
                                ev.prevent_default();
                                fetch_products();
                            }
                        >
                            <input
                                type="search"
                                placeholder="Search products..."
                                class="input input-bordered flex-1"
                                prop:value=move || filters.with(|f| f.search.clone())
                                on:input=move |ev| {
                                    let raw = event_target_value(&ev);
                                    filters.update(|f| f.search = raw);
                                }
                            />
                            <button type="submit" class="btn">"Search"</button>
                            <button type="button" class="btn btn-ghost" on:click=move |_| show_filters.update(|v| *v = !*v)>
                                "Filters"
                            </button>
                        </form>
                        <Show when=move || show_filters.get()>{filter_panel}</Show>
                        {product_grid}
                        {category_list}
                    </div>
                }
                    .into_any(),
                Mode::Create | Mode::Edit => view! {
                    <ProductForm
                        mode=mode
                        product=current
                        categories=categories
                        image=image
                        submitting=submitting
                        on_submit=save_product
                    />
                }
                    .into_any(),
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    #[test]
    fn test_category_name_lookup() {
        let cats = vec![
            Record::new().with("id", 1).with("name", "Seating"),
            Record::new().with("id", 2).with("name", "Tables"),
        ];
        let chair = Record::new().with("category", 1);
        let orphan = Record::new().with("category", 9);
        let loose = Record::new().with("category", serde_json::Value::Null);

        assert_eq!(category_name(&cats, &chair).as_deref(), Some("Seating"));
        assert_eq!(category_name(&cats, &orphan).as_deref(), Some("Unknown Category"));
        assert_eq!(category_name(&cats, &loose), None);
        assert_eq!(category_name(&cats, &Record::new()), None);
    }

    #[test]
    fn test_blank_product_defaults() {
        let blank = blank_product();
        assert_eq!(blank.text_field("condition").as_deref(), Some("NEW"));
        assert_eq!(blank.get("is_available"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(blank.integer_field("stock"), Some(1));
        assert_eq!(blank.get("category"), Some(&Value::Null));
    }

    #[test]
    fn test_image_url() {
        let listed = Record::new().with("image", "https://cdn.shop/chair.jpg");
        assert_eq!(image_url(&listed).as_deref(), Some("https://cdn.shop/chair.jpg"));
        assert_eq!(image_url(&Record::new().with("image", Value::Null)), None);
        assert_eq!(image_url(&Record::new().with("image", "")), None);
    }

    #[test]
    fn test_list_request_after_page_is_gone() {
        let owner = Owner::new();
        let filters = owner.with(|| {
            RwSignal::new(ProductFilters {
                search: "oak".into(),
                ..ProductFilters::default()
            })
        });

        let request = list_request(filters).unwrap();
        assert_eq!(request.filters.search, "oak");

        owner.unset();
        assert!(list_request(filters).is_none());
    }
}
