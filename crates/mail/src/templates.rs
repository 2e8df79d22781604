//! Plain-text bodies for the emails the shop sends.

use storefront_core::money::format_cents;

use crate::MailMessage;

pub fn welcome(to: &str, full_name: Option<&str>) -> MailMessage {
    let greeting = match full_name {
        Some(name) if !name.trim().is_empty() => format!("Hi {},", name.trim()),
        _ => "Hi,".to_string(),
    };
    MailMessage {
        to: to.to_string(),
        subject: "Welcome to the shop".into(),
        body: format!("{greeting}\n\nYour account has been created. Happy shopping!\n"),
    }
}

#[derive(Debug, Clone)]
pub struct OrderEmailLine {
    pub product_name: String,
    pub variant_label: String,
    pub quantity: i32,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone)]
pub struct OrderEmail {
    pub order_id: i64,
    pub lines: Vec<OrderEmailLine>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
}

pub fn order_confirmation(to: &str, order: &OrderEmail) -> MailMessage {
    let mut body = format!("Thank you for your order #{}.\n\n", order.order_id);
    for line in &order.lines {
        body.push_str(&format!(
            "  {} x {} ({})  {}\n",
            line.quantity,
            line.product_name,
            line.variant_label,
            format_cents(line.line_total_cents),
        ));
    }
    body.push_str(&format!("\nSubtotal: {}\n", format_cents(order.subtotal_cents)));
    if order.discount_cents > 0 {
        body.push_str(&format!("Discount: -{}\n", format_cents(order.discount_cents)));
    }
    body.push_str(&format!("Shipping: {}\n", format_cents(order.shipping_cents)));
    body.push_str(&format!("Total:    {}\n", format_cents(order.total_cents)));

    MailMessage {
        to: to.to_string(),
        subject: format!("Order #{} confirmed", order.order_id),
        body,
    }
}

pub fn contact_notification(
    admin_address: &str,
    sender_name: &str,
    sender_email: &str,
    subject: &str,
    message: &str,
) -> MailMessage {
    MailMessage {
        to: admin_address.to_string(),
        subject: format!("[Contact] {subject}"),
        body: format!("From: {sender_name} <{sender_email}>\n\n{message}\n"),
    }
}
