//! The shared form fields for creating and editing budgets.

use maud::{Markup, html};

use crate::{
    category::{Category, INCOME_CATEGORY_ID},
    html::{FORM_LABEL_STYLE, FORM_RADIO_INPUT_STYLE, FORM_TEXT_INPUT_STYLE, color_dot},
    month::format_month_input,
};

/// The values a budget form should be prefilled with.
pub struct BudgetFormDefaults<'a> {
    pub category_id: Option<&'a str>,
    pub amount: Option<f64>,
    pub month: u8,
    pub year: i32,
}

/// The category picker, amount and month inputs shared by the create and
/// edit budget forms.
///
/// The income category is not offered since budgets are spending ceilings.
pub fn budget_form_fields(defaults: &BudgetFormDefaults<'_>, categories: &[Category]) -> Markup {
    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));
    let amount_placeholder = amount_str.as_deref().unwrap_or("0.00");
    let month_value = format_month_input(defaults.month, defaults.year);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Category" }

            div class="grid grid-cols-1 gap-2 sm:grid-cols-2"
            {
                @for category in categories {
                    @if category.id != INCOME_CATEGORY_ID {
                        label
                            class="flex items-center gap-2 rounded border border-gray-200
                                bg-white px-3 py-2 text-sm text-gray-900 cursor-pointer
                                has-checked:border-blue-600 has-checked:bg-blue-50
                                dark:border-gray-600 dark:bg-gray-700 dark:text-white
                                dark:has-checked:bg-gray-600"
                        {
                            input
                                name="category_id"
                                type="radio"
                                value=(category.id)
                                checked[Some(category.id.as_str()) == defaults.category_id]
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            (color_dot(&category.color))

                            span { (category.name) }
                        }
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
                    min="0"
                    placeholder=(amount_placeholder)
                    required
                    value=[amount_str.as_deref()]
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
    }
}
