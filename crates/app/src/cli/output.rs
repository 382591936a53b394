use sanisidro::{
    cart::Cart,
    discounts::Totals,
    orders::Order,
    pricing::from_decimal,
    products::Product,
    promotions::{Promotion, PromotionKind, percent_points},
    receipt::format_soles,
    reservations::Reservation,
    users::User,
};
use tabled::{
    Table,
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Rows},
};

fn styled(builder: Builder) -> Table {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Alignment::center());

    table
}

fn amount(value: rust_decimal::Decimal) -> String {
    from_decimal(value).map_or_else(|_err| value.to_string(), |soles| format_soles(&soles))
}

pub(crate) fn products_table(products: &[Product]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Producto", "Categoría", "Precio", "Disponible"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.to_string(),
            amount(product.price),
            if product.available { "sí" } else { "no" }.to_string(),
        ]);
    }

    styled(builder)
}

pub(crate) fn cart_table(cart: &Cart) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Producto", "Cant.", "P. Unit.", "Subtotal", "Comentarios"]);

    for line in cart.lines() {
        let total = line
            .total()
            .map_or_else(|error| error.to_string(), |total| format_soles(&total));

        builder.push_record([
            line.product_id.to_string(),
            line.name.clone(),
            line.quantity.to_string(),
            amount(line.unit_price),
            total,
            line.comment.clone(),
        ]);
    }

    styled(builder)
}

pub(crate) fn totals_lines(totals: &Totals, code: Option<&str>) -> Vec<String> {
    let discount_label = code.map_or_else(
        || "Descuento".to_string(),
        |code| format!("Descuento ({code})"),
    );

    vec![
        format!("Subtotal: {}", format_soles(&totals.subtotal)),
        format!("{discount_label}: -{}", format_soles(&totals.discount)),
        format!("Total: {}", format_soles(&totals.total)),
    ]
}

pub(crate) fn describe_promotion(promotion: &Promotion) -> String {
    match &promotion.kind {
        PromotionKind::PercentageGeneral(percent) => {
            format!("{}% en todo el pedido", percent_points(*percent))
        }
        PromotionKind::PercentageProduct { percent, products } => format!(
            "{}% en productos seleccionados ({})",
            percent_points(*percent),
            products
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        PromotionKind::FixedAmount(amount) => format!("{} de descuento", format_soles(amount)),
    }
}

pub(crate) fn promotions_table(promotions: &[Promotion]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["Código", "Promoción", "Descuento", "Vigencia", "Activa"]);

    for promotion in promotions {
        let validity = match (promotion.starts_on, promotion.ends_on) {
            (Some(starts), Some(ends)) => format!("{starts} a {ends}"),
            (Some(starts), None) => format!("desde {starts}"),
            (None, Some(ends)) => format!("hasta {ends}"),
            (None, None) => "sin límite".to_string(),
        };

        builder.push_record([
            promotion.code.to_string(),
            promotion.title.clone(),
            describe_promotion(promotion),
            validity,
            if promotion.active { "sí" } else { "no" }.to_string(),
        ]);
    }

    styled(builder)
}

pub(crate) fn orders_table(orders: &[Order]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Factura", "Fecha", "Hora", "Cliente", "Total", "Estado"]);

    for order in orders {
        builder.push_record([
            order.id.map(|id| id.to_string()).unwrap_or_default(),
            order.invoice_number.to_string(),
            order.date.strftime("%d/%m/%Y").to_string(),
            order.time.strftime("%H:%M").to_string(),
            order.customer.clone(),
            amount(order.total),
            order.status.to_string(),
        ]);
    }

    styled(builder)
}

pub(crate) fn reservations_table(reservations: &[Reservation]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Nombre", "Fecha", "Hora", "Personas", "Teléfono", "Estado"]);

    for reservation in reservations {
        builder.push_record([
            reservation.id.map(|id| id.to_string()).unwrap_or_default(),
            reservation.name.clone(),
            reservation.date.strftime("%d/%m/%Y").to_string(),
            reservation.time.strftime("%H:%M").to_string(),
            reservation.party_size.to_string(),
            reservation.phone.clone(),
            reservation.status.to_string(),
        ]);
    }

    styled(builder)
}

pub(crate) fn users_table(users: &[User]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Nombre", "Email", "Teléfono", "Pedidos", "Activo", "Admin"]);

    for user in users {
        builder.push_record([
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.phone.clone().unwrap_or_default(),
            user.order_count.unwrap_or_default().to_string(),
            if user.is_active() { "sí" } else { "no" }.to_string(),
            if user.is_admin() { "sí" } else { "no" }.to_string(),
        ]);
    }

    styled(builder)
}
