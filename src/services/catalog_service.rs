use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{ActiveAdvertisement, ActiveAdvertisementList, CategoryList, MedicineList},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        medicines::{Column as MedicineCol, Entity as Medicines},
    },
    error::{AppError, AppResult},
    models::{Category, Medicine},
    response::{ApiResponse, Meta},
    routes::params::{MedicineQuery, MedicineSortBy, Pagination, SortOrder},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn list_medicines(
    state: &AppState,
    query: MedicineQuery,
) -> AppResult<ApiResponse<MedicineList>> {
    let condition = search_condition(query.q.as_deref());
    find_medicines(state, condition, &query).await
}

pub async fn list_category_medicines(
    state: &AppState,
    category_name: &str,
    query: MedicineQuery,
) -> AppResult<ApiResponse<MedicineList>> {
    let exists = Categories::find()
        .filter(CategoryCol::Name.eq(category_name))
        .one(&state.orm)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    let condition =
        search_condition(query.q.as_deref()).add(MedicineCol::Category.eq(category_name));
    find_medicines(state, condition, &query).await
}

pub async fn list_discount_medicines(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<MedicineList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Medicines::find()
        .filter(MedicineCol::DiscountPercent.gt(0))
        .order_by_desc(MedicineCol::DiscountPercent);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(medicine_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Discounted medicines",
        MedicineList { items },
        Some(meta),
    ))
}

pub async fn get_medicine(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Medicine>> {
    let medicine = Medicines::find_by_id(id).one(&state.orm).await?;
    match medicine {
        Some(m) => Ok(ApiResponse::success(
            "Medicine",
            medicine_from_entity(m),
            None,
        )),
        None => Err(AppError::NotFound),
    }
}

/// Slider membership is admin-controlled through the advertisement pipeline;
/// only active ads show up here, in priority order.
pub async fn active_advertisements(
    state: &AppState,
) -> AppResult<ApiResponse<ActiveAdvertisementList>> {
    let items = sqlx::query_as::<_, ActiveAdvertisement>(
        r#"
        SELECT a.id, a.medicine_id, m.item_name, m.image_url, a.description,
               u.email AS seller_email, a.priority, a.activated_at
        FROM advertisements a
        JOIN medicines m ON m.id = a.medicine_id
        JOIN users u ON u.id = a.seller_id
        WHERE a.is_active
        ORDER BY a.priority ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Active advertisements",
        ActiveAdvertisementList { items },
        None,
    ))
}

fn search_condition(q: Option<&str>) -> Condition {
    let mut condition = Condition::all();
    if let Some(search) = q.filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(MedicineCol::ItemName).ilike(pattern.clone()))
                .add(Expr::col(MedicineCol::GenericName).ilike(pattern.clone()))
                .add(Expr::col(MedicineCol::Company).ilike(pattern)),
        );
    }
    condition
}

async fn find_medicines(
    state: &AppState,
    condition: Condition,
    query: &MedicineQuery,
) -> AppResult<ApiResponse<MedicineList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let sort_by = query.sort_by.unwrap_or(MedicineSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        MedicineSortBy::CreatedAt => MedicineCol::CreatedAt,
        MedicineSortBy::Price => MedicineCol::PerUnitPrice,
        MedicineSortBy::Name => MedicineCol::ItemName,
    };

    let mut finder = Medicines::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(medicine_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Medicines",
        MedicineList { items },
        Some(meta),
    ))
}

pub(crate) fn medicine_from_entity(model: crate::entity::medicines::Model) -> Medicine {
    use chrono::Utc;
    Medicine {
        id: model.id,
        item_name: model.item_name,
        generic_name: model.generic_name,
        short_description: model.short_description,
        image_url: model.image_url,
        category: model.category,
        company: model.company,
        mass_unit: model.mass_unit,
        per_unit_price: model.per_unit_price,
        discount_percent: model.discount_percent,
        seller_id: model.seller_id,
        stock: model.stock,
        sales: model.sales,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn category_from_entity(model: crate::entity::categories::Model) -> Category {
    use chrono::Utc;
    Category {
        id: model.id,
        name: model.name,
        image_url: model.image_url,
        medicine_count: model.medicine_count,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
