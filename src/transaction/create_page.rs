//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles, loading_spinner},
    month::current_month_year,
    navigation::NavBar,
    transaction::form::{TransactionFormDefaults, TransactionType, transaction_form_fields},
};

fn create_transaction_view(categories: &[Category], month: u8, year: i32) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let fields = transaction_form_fields(
        &TransactionFormDefaults {
            transaction_type: TransactionType::Expense,
            amount: None,
            month,
            year,
            description: None,
            category_id: None,
            autofocus_amount: true,
        },
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the create new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The database connection for accessing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for creating a transaction.
///
/// The month input defaults to the current month.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve categories for new transaction page: {error}")
        })?
    };

    let (month, year) = current_month_year();

    Ok(create_transaction_view(&categories, month, year).into_response())
}

#[cfg(test)]
mod view_tests {
    use std::sync::{Arc, Mutex};

    use axum::{body::Body, extract::State, http::StatusCode, response::Response};
    use rusqlite::Connection;
    use scraper::{ElementRef, Html};

    use crate::{
        db::initialize,
        endpoints,
        month::{current_month_year, format_month_input},
        transaction::{create_page::CreateTransactionPageState, get_create_transaction_page},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[tokio::test]
    async fn new_transaction_returns_form() {
        let conn = get_test_connection();
        let state = CreateTransactionPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_create_transaction_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        assert_html_content_type(&response);
        let document = parse_html(response).await;
        assert_valid_html(&document);
        assert_correct_form(&document);
    }

    #[track_caller]
    fn assert_status_ok(response: &Response<Body>) {
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[track_caller]
    fn assert_html_content_type(response: &Response<Body>) {
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[track_caller]
    fn assert_correct_form(document: &Html) {
        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());

        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::TRANSACTIONS_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::TRANSACTIONS_API,
            hx_post
        );

        assert_correct_inputs(form);
        assert_type_radios(form);
        assert_category_select(form);
        assert_has_submit_button(form);
    }

    #[track_caller]
    fn assert_correct_inputs(form: &ElementRef) {
        let expected_input_types = vec![
            ("amount", "number"),
            ("month", "month"),
            ("description", "text"),
        ];

        for (name, element_type) in expected_input_types {
            let selector_string = format!("input[type={element_type}]");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 {element_type} input, got {}",
                inputs.len()
            );

            let input = inputs.first().unwrap();

            let input_name = input.value().attr("name");
            assert_eq!(
                input_name,
                Some(name),
                "want {element_type} with name=\"{name}\", got {input_name:?}"
            );

            match input_name {
                Some("amount") => {
                    assert_required(input);
                    assert_amount_step(input);
                }
                Some("month") => {
                    assert_required(input);
                    let (month, year) = current_month_year();
                    assert_value(input, &format_month_input(month, year));
                }
                _ => {}
            }
        }
    }

    #[track_caller]
    fn assert_type_radios(form: &ElementRef) {
        let radio_selector = scraper::Selector::parse("input[type=radio][name=type_]").unwrap();
        let radios = form.select(&radio_selector).collect::<Vec<_>>();
        let values: Vec<_> = radios
            .iter()
            .filter_map(|radio| radio.value().attr("value"))
            .collect();

        assert_eq!(
            values,
            vec!["expense", "income"],
            "want expense and income radios, got {values:?}"
        );

        let checked: Vec<_> = radios
            .iter()
            .filter(|radio| radio.value().attr("checked").is_some())
            .filter_map(|radio| radio.value().attr("value"))
            .collect();
        assert_eq!(
            checked,
            vec!["expense"],
            "want expense checked by default, got {checked:?}"
        );
    }

    #[track_caller]
    fn assert_category_select(form: &ElementRef) {
        let select_selector = scraper::Selector::parse("select[name=category_id]").unwrap();
        let selects = form.select(&select_selector).collect::<Vec<_>>();
        assert_eq!(
            selects.len(),
            1,
            "want 1 category select, got {}",
            selects.len()
        );

        let option_selector = scraper::Selector::parse("option").unwrap();
        let options = selects
            .first()
            .unwrap()
            .select(&option_selector)
            .collect::<Vec<_>>();

        // The blank uncategorized option plus the nine registered categories.
        assert_eq!(options.len(), 10, "want 10 options, got {}", options.len());
        assert_eq!(options.first().unwrap().value().attr("value"), Some(""));
    }

    #[track_caller]
    fn assert_value(input: &ElementRef, expected_value: &str) {
        let value = input.value().attr("value");
        assert_eq!(
            value,
            Some(expected_value),
            "want input with value=\"{expected_value}\", got {value:?}"
        );
    }

    #[track_caller]
    fn assert_required(input: &ElementRef) {
        let required = input.value().attr("required");
        let input_name = input.value().attr("name").unwrap();
        assert!(
            required.is_some(),
            "want {input_name} input to be required, got {required:?}"
        );
    }

    #[track_caller]
    fn assert_amount_step(input: &ElementRef) {
        let step = input
            .value()
            .attr("step")
            .expect("amount input should have the attribute 'step'");
        let step: f64 = step
            .parse()
            .expect("the attribute 'step' for the amount input should be a float");
        assert_eq!(
            0.01, step,
            "the amount for a new transaction should increment in steps of 0.01, but got {step}"
        );
    }

    #[track_caller]
    fn assert_has_submit_button(form: &ElementRef) {
        let button_selector = scraper::Selector::parse("button[type=submit]").unwrap();
        let buttons = form.select(&button_selector).collect::<Vec<_>>();
        assert_eq!(
            buttons.len(),
            1,
            "want 1 submit button, got {}",
            buttons.len()
        );
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
