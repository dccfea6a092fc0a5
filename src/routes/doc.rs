use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            AdAction, AdminStats, AdvertisementDetail, AdvertisementList, CreateCategoryRequest,
            SalesReport, SalesReportRow, ToggleAdvertisementRequest, UpdateCategoryRequest,
            UpdatePaymentStatusRequest, UpdateRoleRequest, UserList,
        },
        auth::{
            LoginRequest, LoginResponse, ProfileResponse, RegisterRequest, UpdateProfileRequest,
        },
        cart::{AddToCartRequest, CartItemDto, CartView, TotalsDto, UpdateCartItemRequest},
        catalog::{ActiveAdvertisement, ActiveAdvertisementList, CategoryList, MedicineList},
        payment::{CreateIntentResponse, OrderList, OrderWithItems, SaveOrderRequest},
        seller::{
            CreateAdvertisementRequest, CreateMedicineRequest, SellerDashboard,
            SellerPaymentHistory, SellerPaymentRow, UpdateMedicineRequest,
        },
    },
    models::{Advertisement, CartItem, Category, Medicine, Order, OrderItem, Role, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, health, orders, params, payment, seller, user},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        user::get_profile,
        user::update_profile,
        user::payment_history,
        catalog::list_categories,
        catalog::list_category_medicines,
        catalog::list_medicines,
        catalog::list_discount_medicines,
        catalog::get_medicine,
        catalog::active_advertisements,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_item,
        cart::clear_cart,
        payment::create_intent,
        payment::save_order,
        orders::list_orders,
        orders::get_order,
        admin::stats,
        admin::list_users,
        admin::update_role,
        admin::list_categories,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_payments,
        admin::update_payment_status,
        admin::list_advertisements,
        admin::toggle_advertisement,
        admin::sales_report,
        seller::list_medicines,
        seller::create_medicine,
        seller::update_medicine,
        seller::delete_medicine,
        seller::list_advertisements,
        seller::create_advertisement,
        seller::dashboard,
        seller::payment_history
    ),
    components(
        schemas(
            Role,
            User,
            Category,
            Medicine,
            CartItem,
            Order,
            OrderItem,
            Advertisement,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            UpdateProfileRequest,
            CategoryList,
            MedicineList,
            ActiveAdvertisement,
            ActiveAdvertisementList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            TotalsDto,
            CartView,
            CreateIntentResponse,
            SaveOrderRequest,
            OrderWithItems,
            OrderList,
            UpdateRoleRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            UpdatePaymentStatusRequest,
            AdAction,
            ToggleAdvertisementRequest,
            UserList,
            AdminStats,
            SalesReportRow,
            SalesReport,
            AdvertisementDetail,
            AdvertisementList,
            CreateMedicineRequest,
            UpdateMedicineRequest,
            CreateAdvertisementRequest,
            SellerDashboard,
            SellerPaymentRow,
            SellerPaymentHistory,
            params::Pagination,
            params::MedicineQuery,
            params::OrderListQuery,
            params::SalesReportQuery,
            Meta,
            ApiResponse<Medicine>,
            ApiResponse<MedicineList>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AdminStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "User", description = "Profile and purchase history"),
        (name = "Catalog", description = "Public catalog browsing"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Payment", description = "Checkout and order persistence"),
        (name = "Orders", description = "Order lookup"),
        (name = "Admin", description = "Platform administration"),
        (name = "Seller", description = "Seller inventory and advertising"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
