use crate::domain::model::{
    ErrorPolicy, ExtractedFile, LoadResult, OutputOptions, SequenceCursor, SourceFile,
    TransformResult,
};
use crate::utils::error::Result;
use crate::x9::ReaderOptions;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Make sure the output location exists.
    fn create_root(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn location(&self) -> &str;
}

pub trait ConfigProvider: Send + Sync {
    fn output_dir(&self) -> &str;
    fn input_files(&self) -> &[String];
    fn reader_options(&self) -> ReaderOptions;
    fn output_options(&self) -> &OutputOptions;
    fn error_policy(&self) -> ErrorPolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn sources(&self) -> Vec<SourceFile>;
    fn output_dir(&self) -> &str;
    fn error_policy(&self) -> ErrorPolicy;

    async fn prepare(&self) -> Result<()>;
    async fn extract(&self, source: &SourceFile) -> Result<ExtractedFile>;
    async fn transform(
        &self,
        file: ExtractedFile,
        cursor: SequenceCursor,
    ) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadResult>;
}
