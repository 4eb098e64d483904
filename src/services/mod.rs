pub mod gemini;
pub mod mercadopago;
pub mod reminders;
pub mod traits;
pub mod whatsapp;

pub use gemini::GeminiClient;
pub use mercadopago::MercadoPagoClient;
pub use traits::{Notifier, PaymentInfo, PaymentProvider, SummaryGenerator};
pub use whatsapp::WhatsAppClient;
