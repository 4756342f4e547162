//! Production adapters for the content and email seams.

use stride_core::models::content::{ContentRequest, GeneratedContent};
use stride_mail::resend::{EmailMessage, ResendClient};

use crate::content::ContentProvider;
use crate::delivery::{EmailProvider, OutgoingEmail};
use crate::error::{ContentError, SendError};
use crate::BoxFuture;

/// Content from Bedrock's Converse API.
pub struct BedrockContent {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockContent {
    pub fn new(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

impl ContentProvider for BedrockContent {
    fn generate<'a>(
        &'a self,
        model_id: &'a str,
        request: &'a ContentRequest,
    ) -> BoxFuture<'a, Result<GeneratedContent, ContentError>> {
        Box::pin(async move {
            let content =
                stride_bedrock::generate::generate_content(&self.client, model_id, request).await?;
            Ok(content)
        })
    }
}

/// Email through the Resend API.
pub struct ResendMailer {
    client: ResendClient,
}

impl ResendMailer {
    pub fn new(client: ResendClient) -> Self {
        Self { client }
    }
}

impl EmailProvider for ResendMailer {
    fn send<'a>(
        &'a self,
        email: &'a OutgoingEmail,
        idempotency_key: &'a str,
    ) -> BoxFuture<'a, Result<String, SendError>> {
        Box::pin(async move {
            let message = EmailMessage {
                to: email.to.clone(),
                subject: email.subject.clone(),
                html: email.html.clone(),
                idempotency_key: Some(idempotency_key.to_string()),
            };
            Ok(self.client.send(&message).await?)
        })
    }
}
