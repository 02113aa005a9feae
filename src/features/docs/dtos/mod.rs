mod doc_dto;

pub use doc_dto::{
    CodeInputDto, CodeResponseDto, CreateDocDto, DocDetailResponseDto, DocResponseDto,
    DocWithCodesDto, DocsWithCodeQuery, SlugBucketCategoryDto, SlugBucketDto, SlugChildDto,
    UpdateDocDto,
};
