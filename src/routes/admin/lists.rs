use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::binding::Section;
use crate::context::AppContext;
use crate::editor::{BranchForm, ListItem, SocialForm};
use crate::modal::{self, Modal};
use crate::models::document::{Branch, SocialLink};
use crate::toast::Toast;
use super::{page_context, with};

/// Labels and messages of one editable list.
struct ListMeta {
    slug: &'static str,
    section: Section,
    add_label: &'static str,
    add_title: &'static str,
    edit_title: &'static str,
    delete_title: &'static str,
    delete_prompt: &'static str,
    added: &'static str,
    updated: &'static str,
    deleted: &'static str,
    empty: &'static str,
}

const BRANCHES: ListMeta = ListMeta {
    slug: "branches",
    section: Section::Branches,
    add_label: "إضافة فرع جديد",
    add_title: "إضافة فرع جديد",
    edit_title: "تعديل الفرع",
    delete_title: "حذف الفرع",
    delete_prompt: "هل أنت متأكد من حذف هذا الفرع؟",
    added: "تم إضافة الفرع بنجاح",
    updated: "تم تحديث الفرع بنجاح",
    deleted: "تم حذف الفرع بنجاح",
    empty: "لا توجد فروع بعد",
};

const SOCIAL: ListMeta = ListMeta {
    slug: "social",
    section: Section::Social,
    add_label: "إضافة وسيلة تواصل",
    add_title: "إضافة وسيلة تواصل جديدة",
    edit_title: "تعديل وسيلة التواصل",
    delete_title: "حذف وسيلة التواصل",
    delete_prompt: "هل أنت متأكد من حذف وسيلة التواصل هذه؟",
    added: "تم إضافة وسيلة التواصل بنجاح",
    updated: "تم تحديث وسيلة التواصل بنجاح",
    deleted: "تم حذف وسيلة التواصل بنجاح",
    empty: "لا توجد وسائل تواصل بعد",
};

#[derive(Debug, FromForm)]
pub struct DeleteForm {
    #[field(default = false)]
    pub confirmed: bool,
}

/// How a list item shows up in the table and the modal.
trait ListRow: ListItem {
    fn name(&self) -> &str;
    fn row(&self) -> Value;
    fn form_html(item: Option<&Self>, action: &str, close: &str) -> String;
}

impl ListRow for Branch {
    fn name(&self) -> &str {
        &self.name
    }

    fn row(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "detail": self.address, "extra": self.phone })
    }

    fn form_html(item: Option<&Self>, action: &str, close: &str) -> String {
        let form = item.map(BranchForm::from_item).unwrap_or_default();
        modal::branch_form(&form, action, close, item.is_some())
    }
}

impl ListRow for SocialLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn row(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "detail": self.url, "extra": "" })
    }

    fn form_html(item: Option<&Self>, action: &str, close: &str) -> String {
        let form = item.map(SocialForm::from_item).unwrap_or_default();
        modal::social_form(&form, action, close, item.is_some())
    }
}

// ── Shared handlers ────────────────────────────────────

fn list_url(ctx: &AppContext, meta: &ListMeta) -> String {
    format!("{}/{}", ctx.admin_base(), meta.slug)
}

/// `?modal=add`, `?modal=edit&id=` and `?modal=delete&id=` open the modal
/// over the list. An unknown id goes back to the list with an error.
fn build_modal<T: ListRow>(
    ctx: &AppContext,
    meta: &ListMeta,
    modal: Option<&str>,
    id: Option<&str>,
) -> Result<Modal, Flash<Redirect>> {
    let list = list_url(ctx, meta);
    let find = |id: Option<&str>| -> Result<(String, T), Flash<Redirect>> {
        let id = id.unwrap_or_default();
        ctx.workspace
            .find::<T>(id)
            .map(|item| (id.to_string(), item))
            .ok_or_else(|| Toast::error("العنصر غير موجود").redirect(list.clone()))
    };

    Ok(match modal {
        Some("add") => Modal::show(meta.add_title, T::form_html(None, &list, &list), list.clone()),
        Some("edit") => {
            let (id, item) = find(id)?;
            let action = format!("{}/{}", list, id);
            Modal::show(meta.edit_title, T::form_html(Some(&item), &action, &list), list.clone())
        }
        Some("delete") => {
            let (id, item) = find(id)?;
            let action = format!("{}/{}/delete", list, id);
            Modal::show(
                meta.delete_title,
                modal::confirm_delete(meta.delete_prompt, item.name(), &action, &list),
                list.clone(),
            )
        }
        _ => Modal::hidden(),
    })
}

fn list_page<T: ListRow>(
    admin: &AdminUser,
    ctx: &AppContext,
    meta: &ListMeta,
    modal: Option<&str>,
    id: Option<&str>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    let modal = build_modal::<T>(ctx, meta, modal, id)?;
    let fields = ctx
        .workspace
        .section_fields(meta.section)
        .map_err(|e| Toast::error(e).redirect(ctx.admin_base()))?;
    let rows: Vec<Value> = ctx.workspace.items::<T>().iter().map(T::row).collect();
    let list = list_url(ctx, meta);

    let context = page_context(ctx, admin, meta.section, flash);
    let context = with(context, "rows", json!(rows));
    let context = with(context, "list_url", json!(list));
    let context = with(context, "add_label", json!(meta.add_label));
    let context = with(context, "empty_label", json!(meta.empty));
    let context = with(context, "has_section_form", json!(!fields.is_empty()));
    let context = with(
        context,
        "save_action",
        json!(format!("{}/section/{}", ctx.admin_base(), meta.section.slug())),
    );
    let context = with(context, "fields", json!(fields));
    let context = with(context, "modal", json!(modal.render()));
    Ok(Template::render("admin/list", &context))
}

fn add_item<T: ListRow>(ctx: &AppContext, meta: &ListMeta, parsed: Result<T, String>) -> Flash<Redirect> {
    let list = list_url(ctx, meta);
    let item = match parsed {
        Ok(item) => item,
        Err(msg) => return Toast::error(msg).redirect(format!("{}?modal=add", list)),
    };
    match ctx.workspace.add(item) {
        Ok(id) => {
            log::info!("Added {} item {}", meta.slug, id);
            Toast::success(meta.added).redirect(list)
        }
        Err(e) => Toast::error(e).redirect(list),
    }
}

fn update_item<T: ListRow>(
    ctx: &AppContext,
    meta: &ListMeta,
    id: &str,
    parsed: Result<T, String>,
) -> Flash<Redirect> {
    let list = list_url(ctx, meta);
    let item = match parsed {
        Ok(item) => item,
        Err(msg) => return Toast::error(msg).redirect(format!("{}?modal=edit&id={}", list, id)),
    };
    match ctx.workspace.update(id, item) {
        Ok(()) => Toast::success(meta.updated).redirect(list),
        Err(e) => Toast::error(e).redirect(list),
    }
}

fn delete_item<T: ListRow>(ctx: &AppContext, meta: &ListMeta, id: &str, confirmed: bool) -> Flash<Redirect> {
    let list = list_url(ctx, meta);
    if !confirmed {
        return Toast::info("تم إلغاء الحذف").redirect(list);
    }
    match ctx.workspace.delete::<T>(id) {
        Ok(removed) => {
            log::info!("Deleted {} item '{}'", meta.slug, removed.name());
            Toast::success(meta.deleted).redirect(list)
        }
        Err(e) => Toast::error(e).redirect(list),
    }
}

// ── Branches ───────────────────────────────────────────

#[get("/branches?<modal>&<id>")]
pub fn branches_page(
    admin: AdminUser,
    ctx: &State<AppContext>,
    modal: Option<&str>,
    id: Option<&str>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    list_page::<Branch>(&admin, ctx, &BRANCHES, modal, id, flash)
}

#[post("/branches", data = "<form>")]
pub fn branches_add(_admin: AdminUser, ctx: &State<AppContext>, form: Form<BranchForm>) -> Flash<Redirect> {
    add_item(ctx, &BRANCHES, form.into_inner().into_item())
}

#[post("/branches/<id>", data = "<form>")]
pub fn branches_update(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    id: &str,
    form: Form<BranchForm>,
) -> Flash<Redirect> {
    update_item(ctx, &BRANCHES, id, form.into_inner().into_item())
}

#[post("/branches/<id>/delete", data = "<form>")]
pub fn branches_delete(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    id: &str,
    form: Form<DeleteForm>,
) -> Flash<Redirect> {
    delete_item::<Branch>(ctx, &BRANCHES, id, form.confirmed)
}

// ── Social links ───────────────────────────────────────

#[get("/social?<modal>&<id>")]
pub fn social_page(
    admin: AdminUser,
    ctx: &State<AppContext>,
    modal: Option<&str>,
    id: Option<&str>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    list_page::<SocialLink>(&admin, ctx, &SOCIAL, modal, id, flash)
}

#[post("/social", data = "<form>")]
pub fn social_add(_admin: AdminUser, ctx: &State<AppContext>, form: Form<SocialForm>) -> Flash<Redirect> {
    add_item(ctx, &SOCIAL, form.into_inner().into_item())
}

#[post("/social/<id>", data = "<form>")]
pub fn social_update(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    id: &str,
    form: Form<SocialForm>,
) -> Flash<Redirect> {
    update_item(ctx, &SOCIAL, id, form.into_inner().into_item())
}

#[post("/social/<id>/delete", data = "<form>")]
pub fn social_delete(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    id: &str,
    form: Form<DeleteForm>,
) -> Flash<Redirect> {
    delete_item::<SocialLink>(ctx, &SOCIAL, id, form.confirmed)
}
