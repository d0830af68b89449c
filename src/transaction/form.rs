use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    category::Category,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    month::format_month_input,
};

/// Whether a transaction records money spent or money received.
///
/// The form collects a positive dollar amount plus this choice; the stored
/// amount is signed accordingly (see [signed_amount]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

/// Convert the form's positive amount into the signed amount stored in the
/// database: negative for expenses, positive for income.
pub fn signed_amount(transaction_type: TransactionType, amount: f64) -> f64 {
    match transaction_type {
        TransactionType::Expense => -amount.abs(),
        TransactionType::Income => amount.abs(),
    }
}

pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    pub month: u8,
    pub year: i32,
    pub description: Option<&'a str>,
    pub category_id: Option<&'a str>,
    pub autofocus_amount: bool,
}

pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);
    let amount_str = defaults.amount.map(|amount| format!("{:.2}", amount.abs()));
    let amount_placeholder = amount_str.as_deref().unwrap_or("0.01");
    let description_placeholder = defaults.description.unwrap_or("Description");
    let month_value = format_month_input(defaults.month, defaults.year);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder=(amount_placeholder)
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="month"
                class=(FORM_LABEL_STYLE)
            {
                "Month"
            }

            input
                name="month"
                id="month"
                type="month"
                value=(month_value)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder=(description_placeholder)
                value=[defaults.description]
                minlength="2"
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category_id"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category_id"
                id="category_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Uncategorized" }

                @for category in categories {
                    @if Some(category.id.as_str()) == defaults.category_id {
                        option value=(category.id) selected { (category.name) }
                    } @else {
                        option value=(category.id) { (category.name) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{TransactionFormDefaults, TransactionType, signed_amount, transaction_form_fields};
    use crate::category::Category;

    #[test]
    fn signed_amount_negates_expenses() {
        assert_eq!(signed_amount(TransactionType::Expense, 12.5), -12.5);
        assert_eq!(signed_amount(TransactionType::Income, 12.5), 12.5);
    }

    #[test]
    fn signed_amount_ignores_the_sign_of_the_input() {
        assert_eq!(signed_amount(TransactionType::Expense, -12.5), -12.5);
        assert_eq!(signed_amount(TransactionType::Income, -12.5), 12.5);
    }

    #[test]
    fn transaction_form_fields_checks_selected_type() {
        let cases = [
            (TransactionType::Expense, "expense"),
            (TransactionType::Income, "income"),
        ];

        for (transaction_type, expected) in cases {
            let html = render_fields(transaction_type, None);
            assert_checked_value(&html, expected);
        }
    }

    #[test]
    fn transaction_form_fields_prefills_month_input() {
        let html = render_fields(TransactionType::Expense, None);

        let selector = Selector::parse("input[type=month][name=month]").unwrap();
        let input = html
            .select(&selector)
            .next()
            .expect("want a month input in the form fields");
        assert_eq!(input.value().attr("value"), Some("2025-06"));
    }

    #[test]
    fn transaction_form_fields_marks_selected_category() {
        let html = render_fields(TransactionType::Expense, Some("housing"));

        let selector = Selector::parse("select[name=category_id] option").unwrap();
        let selected = html
            .select(&selector)
            .find(|option| option.value().attr("selected").is_some())
            .expect("want one category option to be selected");
        assert_eq!(selected.value().attr("value"), Some("housing"));
    }

    #[test]
    fn transaction_form_fields_offers_uncategorized_first() {
        let html = render_fields(TransactionType::Expense, None);

        let selector = Selector::parse("select[name=category_id] option").unwrap();
        let first = html
            .select(&selector)
            .next()
            .expect("want category options in the form fields");
        assert_eq!(first.value().attr("value"), Some(""));
        assert_eq!(first.text().collect::<String>(), "Uncategorized");
    }

    fn render_fields(transaction_type: TransactionType, category_id: Option<&str>) -> Html {
        let categories = vec![
            Category {
                id: "food".to_owned(),
                name: "Food & Dining".to_owned(),
                color: "#38b26f".to_owned(),
            },
            Category {
                id: "housing".to_owned(),
                name: "Housing".to_owned(),
                color: "#e67e22".to_owned(),
            },
        ];
        let fields = transaction_form_fields(
            &TransactionFormDefaults {
                transaction_type,
                amount: None,
                month: 6,
                year: 2025,
                description: None,
                category_id,
                autofocus_amount: false,
            },
            &categories,
        );
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    #[track_caller]
    fn assert_checked_value(document: &Html, expected: &str) {
        let selector = Selector::parse("input[type=radio][name=type_]").unwrap();
        let inputs = document.select(&selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            2,
            "want 2 transaction type inputs, got {}",
            inputs.len()
        );

        let checked = inputs
            .iter()
            .find(|input| input.value().attr("checked").is_some())
            .and_then(|input| input.value().attr("value"));
        assert_eq!(
            checked,
            Some(expected),
            "want checked transaction type to be {expected}, got {checked:?}"
        );
    }
}
