use serde::Serialize;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TemplateService: Send + Sync + 'static {
    /// Render the given template.
    fn render<T: Template + 'static>(&self, template: &T) -> anyhow::Result<String>;
}

#[cfg(feature = "mock")]
impl MockTemplateService {
    pub fn with_render<T: Template + Send + PartialEq + std::fmt::Debug + 'static>(
        mut self,
        template: T,
        result: String,
    ) -> Self {
        self.expect_render()
            .once()
            .with(mockall::predicate::eq(template))
            .return_once(|_| Ok(result));
        self
    }
}

/// An HTML template.
///
/// Templates are rendered without auto escaping. Every value that originates
/// from user input must be escaped before it is put into a template.
pub trait Template: Serialize {
    const NAME: &'static str;
    const TEMPLATE: &'static str;
}

pub const BASE_TEMPLATE: &str = include_str!("../templates/base.html");

macro_rules! templates {
    ($( $ident:ident ( $path:literal ), )* ) => {
        $(
            impl Template for $ident {
                const NAME: &'static str = stringify!($ident);
                const TEMPLATE: &'static str = include_str!(concat!("../templates/", $path));
            }
        )*

        pub const TEMPLATES: &[(&str, &str)] = &[
            $( ($ident::NAME, $ident::TEMPLATE) ),*
        ];
    };
}

templates! {
    ContactNotificationTemplate("contact_notification.html"),
}

/// Notification sent to the site owner for every contact form submission.
///
/// All fields contain escaped HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactNotificationTemplate {
    pub name: String,
    pub email: String,
    /// Message body with line breaks already converted to `<br>` tags.
    pub message: String,
    pub origin: Option<String>,
    pub received_at: String,
}
