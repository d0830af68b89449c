use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{endpoints, html::base};

fn forgot_password_template() -> Markup {
    let content = html! {
        // Template adapted from https://flowbite.com/blocks/marketing/register/
        div
            class="flex flex-col items-center justify-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            a
                href="#"
                class="flex items-center mb-6 text-2xl font-semibold"
            {
                img
                    src="/static/favicon-128x128.png"
                    alt="logo"
                    class="w-8 h-8 mr-2";
                "Centsible"
            }
            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1
                        class="text-xl font-bold md:text-2xl"
                    {
                        "Forgot your password?"
                    }
                    p class="text-justify"
                    {
                        "To reset your password, go to the directory where this server is
                    running from and run the program 'reset_password', pointing it at
                    your database file with the --db-path flag. Once the password has
                    been reset, come back and log in with your new password."
                    }
                    p class="text-sm font-light text-gray-500 dark:text-gray-400"
                    {
                        "All done? "
                        a
                            href=(endpoints::LOG_IN_VIEW) tabindex="0"
                            class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                        {
                            "Log in here"
                        }
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
